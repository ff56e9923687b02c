//! REST API for movierec.
//!
//! Serves recommendations from an in-memory [`SimilarityIndex`] held in an
//! [`IndexHandle`]. The index is built before the server starts and can be
//! rebuilt from the configured catalog file with `POST /reload`.
//!
//! ## Endpoints
//!
//! - `POST /recommend` - Recommend similar titles for one or more queries
//! - `GET /titles` - List catalog titles in build order
//! - `POST /reload` - Rebuild the index from the catalog file and swap it in
//!
//! ## Usage
//!
//! ```rust,no_run
//! use actix_web::{web, App, HttpServer};
//! use movierec::{server::AppState, IndexConfig, SimilarityIndex};
//!
//! #[actix_web::main]
//! async fn main() -> std::io::Result<()> {
//!     let index = SimilarityIndex::build(Vec::new(), &IndexConfig::default());
//!     let state = web::Data::new(AppState::new(index));
//!     HttpServer::new(move || App::new().app_data(state.clone()).configure(movierec::server::config))
//!         .bind("0.0.0.0:7878")?
//!         .run()
//!         .await
//! }
//! ```

use crate::{
    catalog::load_catalog,
    config::IndexConfig,
    index::{IndexHandle, DEFAULT_TOP_K},
    Error, SimilarityIndex,
};
use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Shared server state.
pub struct AppState {
    index: IndexHandle,
    catalog_path: Option<PathBuf>,
    index_config: IndexConfig,
    top_k: usize,
}

impl AppState {
    pub fn new(index: SimilarityIndex) -> AppState {
        AppState {
            index: IndexHandle::new(index),
            catalog_path: None,
            index_config: IndexConfig::default(),
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Catalog file and build parameters used by `/reload`.
    pub fn with_catalog(mut self, path: impl Into<PathBuf>, config: IndexConfig) -> AppState {
        self.catalog_path = Some(path.into());
        self.index_config = config;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> AppState {
        self.top_k = top_k;
        self
    }

    /// Builds a fresh index from the catalog file and swaps it in.
    pub fn reload(&self) -> Result<(usize, usize), Error> {
        let path = self.catalog_path.as_ref().ok_or(Error::MissingCatalog)?;
        let records = load_catalog(path)?;
        let index = SimilarityIndex::from_records(&records, &self.index_config);
        let stats = (index.len(), index.vocabulary().len());
        self.index.replace(index);
        tracing::info!(items = stats.0, vocabulary = stats.1, "index reloaded");
        Ok(stats)
    }
}

// --- Request structs ---

#[derive(Deserialize)]
struct Query {
    title: String,
    top_k: Option<usize>,
}

#[derive(Deserialize)]
struct RecommendRequest {
    queries: Vec<Query>,
}

// --- Response structs ---

#[derive(Serialize)]
struct RecommendResponse {
    results: Vec<RecommendResultGroup>,
}

#[derive(Serialize)]
struct RecommendResultGroup {
    title: String,
    found: bool,
    matches: Vec<MatchResult>,
    message: String,
}

#[derive(Serialize)]
struct MatchResult {
    id: i64,
    title: String,
    score: f32,
}

#[derive(Serialize)]
struct TitlesResponse {
    count: usize,
    titles: Vec<String>,
}

#[derive(Serialize)]
struct ReloadResponse {
    items: usize,
    vocabulary: usize,
}

// --- Handlers ---

async fn recommend_handler(
    state: web::Data<AppState>,
    body: web::Json<RecommendRequest>,
) -> impl Responder {
    let index = state.index.current();
    let mut results = Vec::new();

    for query in &body.queries {
        let top_k = query.top_k.unwrap_or(state.top_k);
        match index.neighbors(&query.title, top_k) {
            Some(neighbors) => {
                results.push(RecommendResultGroup {
                    title: query.title.clone(),
                    found: true,
                    matches: neighbors
                        .into_iter()
                        .map(|n| MatchResult { id: n.id, title: n.title, score: n.score })
                        .collect(),
                    message: "Recommend Success".to_string(),
                });
            }
            None => {
                tracing::warn!(title = %query.title, "title not found in catalog");
                results.push(RecommendResultGroup {
                    title: query.title.clone(),
                    found: false,
                    matches: Vec::new(),
                    message: "Movie not found in catalog".to_string(),
                });
            }
        }
    }

    HttpResponse::Ok().json(RecommendResponse { results })
}

async fn titles_handler(state: web::Data<AppState>) -> impl Responder {
    let index = state.index.current();
    let titles: Vec<String> = index.titles().map(str::to_string).collect();

    HttpResponse::Ok().json(TitlesResponse { count: titles.len(), titles })
}

async fn reload_handler(state: web::Data<AppState>) -> impl Responder {
    // build is blocking CPU work; keep it off the async workers
    let result = web::block(move || state.reload()).await;

    match result {
        Ok(Ok((items, vocabulary))) => HttpResponse::Ok().json(ReloadResponse { items, vocabulary }),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "reload failed");
            HttpResponse::InternalServerError().json(serde_json::json!({"error": e.to_string()}))
        }
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({"error": e.to_string()})),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/recommend").route(web::post().to(recommend_handler)))
       .service(web::resource("/titles").route(web::get().to(titles_handler)))
       .service(web::resource("/reload").route(web::post().to(reload_handler)));
}

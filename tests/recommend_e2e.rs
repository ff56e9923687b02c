use movierec::{catalog::load_catalog, IndexConfig, RawRecord, SimilarityIndex};
use std::time::Instant;

const WORDS: &[&str] = &[
    "space", "alien", "robot", "war", "love", "heist", "dragon", "wizard",
    "detective", "murder", "ocean", "pirate", "zombie", "vampire", "cowboy",
    "samurai", "spy", "hacker", "dinosaur", "cooking",
];

const GENRES: &[&str] = &["Action", "Drama", "Comedy", "Horror", "Science Fiction", "Romance"];

/// Simple LCG pseudo-random generator (no external dep needed)
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((self.0 >> 33) as usize) % bound
    }
}

fn random_catalog(count: usize, seed: u64) -> Vec<RawRecord> {
    let mut rng = Lcg(seed);
    (0..count)
        .map(|i| {
            let genres: Vec<String> = (0..rng.next(3))
                .map(|_| format!(r#"{{"id": 1, "name": "{}"}}"#, GENRES[rng.next(GENRES.len())]))
                .collect();
            let overview: Vec<&str> = (0..rng.next(8)).map(|_| WORDS[rng.next(WORDS.len())]).collect();

            RawRecord {
                id: i as i64,
                // every 50th title repeats an earlier one
                title: if i % 50 == 49 { format!("Movie {}", i - 10) } else { format!("Movie {}", i) },
                genres: Some(format!("[{}]", genres.join(", "))),
                keywords: if i % 7 == 0 { Some("not a list".to_string()) } else { Some("[]".to_string()) },
                overview: if i % 11 == 0 { None } else { Some(overview.join(" ")) },
            }
        })
        .collect()
}

#[test]
fn test_matrix_properties_on_generated_catalog() {
    let records = random_catalog(300, 7);

    let start = Instant::now();
    let index = SimilarityIndex::from_records(&records, &IndexConfig::default());
    println!("Built index of {} items in {:.3}s", index.len(), start.elapsed().as_secs_f64());

    let n = index.len();
    assert_eq!(n, 300);
    assert_eq!(index.matrix().size(), n);

    for i in 0..n {
        let nonzero = index.feature_vector(i).unwrap().iter().any(|&c| c > 0);
        let diag = index.similarity(i, i).unwrap();
        if nonzero {
            assert!((diag - 1.0).abs() < 1e-6, "diagonal {} is {}", i, diag);
        } else {
            assert_eq!(diag, 0.0);
        }

        for j in 0..n {
            let sim = index.similarity(i, j).unwrap();
            assert_eq!(sim, index.similarity(j, i).unwrap(), "asymmetric at {},{}", i, j);
            assert!((0.0..=1.0).contains(&sim), "out of range at {},{}: {}", i, j, sim);
        }
    }
}

#[test]
fn test_build_is_bit_identical() {
    let records = random_catalog(200, 42);
    let a = SimilarityIndex::from_records(&records, &IndexConfig::default());
    let b = SimilarityIndex::from_records(&records, &IndexConfig::default());

    assert_eq!(a.vocabulary(), b.vocabulary());
    let bits = |index: &SimilarityIndex| -> Vec<u32> {
        (0..index.len())
            .flat_map(|i| index.matrix().row(i).iter().map(|v| v.to_bits()).collect::<Vec<_>>())
            .collect()
    };
    assert_eq!(bits(&a), bits(&b));
}

#[test]
fn test_recommend_properties_on_generated_catalog() {
    let records = random_catalog(200, 99);
    let index = SimilarityIndex::from_records(&records, &IndexConfig::default());

    for title in index.titles() {
        for k in [0, 1, 5, 500] {
            let recs = index.recommend(title, k);
            assert!(recs.len() <= k);
            assert!(recs.len() < index.len());
            assert!(!recs.iter().any(|t| t == title), "'{}' recommended itself", title);
            // repeatable
            assert_eq!(recs, index.recommend(title, k));
        }

        // scores are non-increasing, ties by ascending row
        let neighbors = index.neighbors(title, 500).unwrap();
        for w in neighbors.windows(2) {
            assert!(w[0].score >= w[1].score, "results not sorted by score");
            if w[0].score == w[1].score {
                assert!(w[0].row < w[1].row, "ties not ordered by row");
            }
        }
    }

    assert!(index.recommend("Nonexistent Title XYZ", 5).is_empty());
}

#[test]
fn test_vocabulary_bounded() {
    let records = random_catalog(100, 3);
    let index = SimilarityIndex::from_records(&records, &IndexConfig::default().with_max_features(5));
    assert_eq!(index.vocabulary().len(), 5);

    let tokens = index.vocabulary().tokens();
    assert!(tokens.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_duplicate_title_uses_first_occurrence() {
    let records = random_catalog(100, 5);
    // "Movie 39" appears at rows 39 and 49
    let index = SimilarityIndex::from_records(&records, &IndexConfig::default());
    assert_eq!(index.position("Movie 39"), Some(39));

    let first = index.neighbors("Movie 39", 10).unwrap();
    let expected: Vec<f32> = first.iter().map(|n| index.similarity(39, n.row).unwrap()).collect();
    assert_eq!(first.iter().map(|n| n.score).collect::<Vec<_>>(), expected);
    assert!(!first.iter().any(|n| n.row == 49));
}

#[test]
fn test_malformed_fields_do_not_fail_build() {
    let records = vec![
        RawRecord {
            id: 1,
            title: "Broken".to_string(),
            genres: Some("not a list".to_string()),
            keywords: Some("{\"name\": \"x\"}".to_string()),
            overview: None,
        },
        RawRecord {
            id: 2,
            title: "Fine".to_string(),
            genres: Some(r#"[{"id": 1, "name": "Drama"}]"#.to_string()),
            keywords: Some("[]".to_string()),
            overview: Some("a quiet drama".to_string()),
        },
    ];

    let index = SimilarityIndex::from_records(&records, &IndexConfig::default());
    assert_eq!(index.item(0).unwrap().tag, "  ");
    assert_eq!(index.recommend("Broken", 5), vec!["Fine"]);
    assert_eq!(index.similarity(0, 1), Some(0.0));
}

#[test]
fn test_csv_and_json_catalogs_match() {
    let dir = tempfile::tempdir().unwrap();

    let csv_path = dir.path().join("movies.csv");
    std::fs::write(
        &csv_path,
        "id,title,genres,keywords,overview\n\
         1,A,[],[],space adventure\n\
         2,B,[],[],space adventure\n\
         3,C,[],[],cooking show\n",
    )
    .unwrap();

    let json_path = dir.path().join("movies.json");
    std::fs::write(
        &json_path,
        r#"[{"id":1,"title":"A","genres":"[]","keywords":"[]","overview":"space adventure"},
            {"id":2,"title":"B","genres":"[]","keywords":"[]","overview":"space adventure"},
            {"id":3,"title":"C","genres":"[]","keywords":"[]","overview":"cooking show"}]"#,
    )
    .unwrap();

    let from_csv = load_catalog(&csv_path).unwrap();
    let from_json = load_catalog(&json_path).unwrap();
    assert_eq!(from_csv, from_json);

    let index = SimilarityIndex::from_records(&from_csv, &IndexConfig::default());
    assert_eq!(index.recommend("A", 2), vec!["B", "C"]);
}

#[test]
fn test_python_literal_fields_match_json_fields() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("movies.csv");
    std::fs::write(
        &csv_path,
        "id,title,genres,keywords,overview\n\
         1,A,\"[{'id': 878, 'name': 'Science Fiction'}]\",\"[{'id': 1, 'name': 'alien'}]\",\n\
         2,B,\"[{\"\"id\"\": 878, \"\"name\"\": \"\"Science Fiction\"\"}]\",\"[{\"\"id\"\": 1, \"\"name\"\": \"\"alien\"\"}]\",\n\
         3,C,\"[{'id': 35, 'name': 'Comedy'}]\",[],\n",
    )
    .unwrap();

    let records = load_catalog(&csv_path).unwrap();
    let index = SimilarityIndex::from_records(&records, &IndexConfig::default());

    assert_eq!(index.item(0).unwrap().tag, index.item(1).unwrap().tag);
    assert_eq!(index.item(0).unwrap().tag, "Science Fiction alien ");
    assert!((index.similarity(0, 1).unwrap() - 1.0).abs() < 1e-6);
    assert_eq!(index.recommend("A", 2), vec!["B", "C"]);
}

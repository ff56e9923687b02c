use std::io::{self, Write};
use std::path::{Path, PathBuf};
use movierec::{catalog::load_catalog, AppConfig, SimilarityIndex};

pub enum Command {
    Recommend { title: String, k_top: usize },
    Show { title: String },
    Titles,
    Count,
    Reload,
}

/// Parse a command from a provided argument vector
/// This is used both for command-line args and REPL input
pub fn parse_command_from_args(args: &[String], default_k: usize) -> Result<Command, String> {
    if args.len() < 2 {
        return Err("No command provided. Use: recommend, show, titles, count, reload".to_string());
    }

    let command = &args[1];

    match command.as_str() {
        "recommend" => parse_recommend(args, default_k),
        "show" => parse_show(args),
        "titles" => parse_no_args(args, Command::Titles),
        "count" => parse_no_args(args, Command::Count),
        "reload" => parse_no_args(args, Command::Reload),
        _ => Err(format!("Unknown command: {}. Available: recommend, show, titles, count, reload", command)),
    }
}

/// Parse the 'recommend' command
/// Usage: movierec recommend <title...> [--k_top <number>]
fn parse_recommend(args: &[String], default_k: usize) -> Result<Command, String> {
    // args[0] = program name
    // args[1] = "recommend"
    // args[2..] = title words and optional --k_top flag
    if args.len() < 3 {
        return Err("'recommend' command requires a title. Usage: recommend <title> [--k_top <number>]".to_string());
    }

    let mut k_top = default_k;
    let mut title_end = args.len();

    // Check if last two args are --k_top and a number
    if args.len() >= 4 && args[args.len() - 2] == "--k_top" {
        match args[args.len() - 1].parse::<usize>() {
            Ok(k) => {
                k_top = k;
                title_end = args.len() - 2;
            }
            Err(_) => {
                return Err(format!("Invalid --k_top value: '{}'. Must be a positive integer.", args[args.len() - 1]));
            }
        }
    }

    let title = args[2..title_end].join(" ");
    if title.is_empty() {
        return Err("Title cannot be empty".to_string());
    }

    Ok(Command::Recommend { title, k_top })
}

/// Parse the 'show' command
/// Usage: movierec show <title...>
fn parse_show(args: &[String]) -> Result<Command, String> {
    if args.len() < 3 {
        return Err("'show' command requires a title. Usage: show <title>".to_string());
    }

    Ok(Command::Show { title: args[2..].join(" ") })
}

fn parse_no_args(args: &[String], command: Command) -> Result<Command, String> {
    if args.len() > 2 {
        eprintln!("Warning: '{}' command takes no arguments, ignoring extras", args[1]);
    }

    Ok(command)
}

/// Loads the catalog at `path` and builds an index over it
pub fn build_index(path: &Path, config: &AppConfig) -> Result<SimilarityIndex, movierec::Error> {
    let records = load_catalog(path)?;
    Ok(SimilarityIndex::from_records(&records, &config.index_config()))
}

/// REPL mode - interactive session over one built index
pub fn run_repl(catalog: PathBuf, config: &AppConfig) {
    let mut index = match build_index(&catalog, config) {
        Ok(index) => index,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!("movierec - Movie Recommendations");
    println!("Loaded {} movies from '{}'", index.len(), catalog.display());
    println!("Type 'help' for commands, 'exit' or 'quit' to quit\n");

    loop {
        print!("movierec> ");
        if let Err(error) = io::stdout().flush() {
            eprintln!("Error writing prompt: {}", error);
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                continue;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if input == "exit" || input == "quit" {
            println!("Goodbye!");
            break;
        }

        if input == "help" {
            print_help();
            continue;
        }

        let mut args: Vec<String> = vec!["movierec".to_string()];
        args.extend(input.split_whitespace().map(|s| s.to_string()));

        let command = match parse_command_from_args(&args, config.top_k) {
            Ok(cmd) => cmd,
            Err(error) => {
                eprintln!("Error: {}", error);
                continue;
            }
        };

        if let Command::Reload = command {
            match build_index(&catalog, config) {
                Ok(rebuilt) => {
                    index = rebuilt;
                    println!("Reloaded {} movies from '{}'", index.len(), catalog.display());
                }
                Err(error) => eprintln!("Error: {}", error),
            }
            continue;
        }

        execute_command(&index, command);
    }
}

/// Single-command mode - load catalog from path, build, execute command
/// Usage: movierec <catalog_path> <command> [args...]
pub fn run_single_command(args: &[String], config: &AppConfig) {
    let catalog = Path::new(&args[1]);

    let index = match build_index(catalog, config) {
        Ok(index) => index,
        Err(e) => {
            eprintln!("Error loading '{}': {}", catalog.display(), e);
            std::process::exit(1);
        }
    };

    // Rebuild args: shift so args[1] becomes the command
    let shifted_args: Vec<String> = std::iter::once(args[0].clone())
        .chain(args[2..].iter().cloned())
        .collect();

    let command = match parse_command_from_args(&shifted_args, config.top_k) {
        Ok(Command::Reload) => {
            eprintln!("Error: 'reload' is only available in the REPL");
            std::process::exit(1);
        }
        Ok(cmd) => cmd,
        Err(error) => {
            eprintln!("Error: {}", error);
            std::process::exit(1);
        }
    };

    execute_command(&index, command);
}

fn execute_command(index: &SimilarityIndex, command: Command) {
    match command {
        Command::Recommend { title, k_top } => {
            match index.neighbors(&title, k_top) {
                None => eprintln!("Movie '{}' not found in catalog", title),
                Some(neighbors) if neighbors.is_empty() => println!("No similar movies found"),
                Some(neighbors) => {
                    println!("Top {} recommendations for '{}':", neighbors.len(), title);
                    for (rank, n) in neighbors.iter().enumerate() {
                        println!("{}. {} (ID: {}, Score: {:.4})", rank + 1, n.title, n.id, n.score);
                    }
                }
            }
        }

        Command::Show { title } => {
            match index.position(&title) {
                None => eprintln!("Movie '{}' not found in catalog", title),
                Some(row) => {
                    if let Some(item) = index.item(row) {
                        println!("ID: {}", item.id);
                        println!("Title: {}", item.title);
                        println!("Tag: {}", item.tag);
                    }
                    if let Some(features) = index.features(row) {
                        let rendered: Vec<String> = features
                            .iter()
                            .map(|(token, count)| format!("{}:{}", token, count))
                            .collect();
                        println!("Features: {}", rendered.join(" "));
                    }
                }
            }
        }

        Command::Titles => {
            if index.is_empty() {
                println!("Catalog is empty");
            } else {
                for (row, title) in index.titles().enumerate() {
                    println!("  {}: {}", row, title);
                }
                println!("Total: {} movies", index.len());
            }
        }

        Command::Count => println!("{}", index.len()),

        // handled by the REPL loop
        Command::Reload => {}
    }
}

fn print_help() {
    println!("Available commands:");
    println!("  recommend <title> [--k_top N] - Recommend similar movies (default k=5)");
    println!("  show <title>                  - Show a movie's tag and features");
    println!("  titles                        - List all titles");
    println!("  count                         - Show movie count");
    println!("  reload                        - Rebuild the index from the catalog file");
    println!("  help                          - Show this help");
    println!("  exit, quit                    - Exit the program");
}

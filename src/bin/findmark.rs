use clap::{Parser, Subcommand};
use findmark::replace::safe_replace;
use findmark::search::find_matches;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;
use unicode_segmentation::UnicodeSegmentation;
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "findmark")]
#[command(about = "Search and replace across Markdown notes", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find occurrences of a literal string
    Find {
        /// Literal text to search for
        query: String,
        /// Files or directories to search (default: current directory)
        paths: Vec<PathBuf>,
        /// Match case exactly
        #[arg(short = 's', long)]
        case_sensitive: bool,
    },
    /// Replace occurrences, leaving link destinations and attribute blocks alone
    Replace {
        /// Literal text to replace
        search: String,
        /// Replacement text
        replace: String,
        /// Files or directories to rewrite (default: current directory)
        paths: Vec<PathBuf>,
        /// Match case exactly
        #[arg(short = 's', long)]
        case_sensitive: bool,
        /// Report what would change without writing anything
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
}

#[derive(Deserialize, Debug)]
struct Config {
    #[serde(default)]
    case_sensitive: bool,
    #[serde(default = "default_extensions")]
    extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Config {
            case_sensitive: false,
            extensions: default_extensions(),
        }
    }
}

impl Config {
    fn load() -> Self {
        let config_path = Self::config_path();
        if let Some(path) = config_path {
            if path.exists() {
                if let Ok(contents) = fs::read_to_string(&path) {
                    if let Ok(config) = toml::from_str::<Config>(&contents) {
                        return config;
                    }
                }
            }
        }
        Config::default()
    }

    fn config_path() -> Option<PathBuf> {
        env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".findmarkrc"))
    }
}

/// Expand files and directories into the list of files to process.
/// Directories are walked recursively, filtered by the configured
/// extensions; explicitly named files are always taken.
fn collect_files(paths: &[PathBuf], extensions: &[String]) -> Result<Vec<PathBuf>, String> {
    let paths = if paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        paths.to_vec()
    };

    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path);
            continue;
        }
        if !path.is_dir() {
            return Err(format!("No such file or directory: {}", path.display()));
        }
        for entry in WalkDir::new(&path).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let matches_ext = entry
                .path()
                .extension()
                .and_then(|s| s.to_str())
                .map(|ext| extensions.iter().any(|e| e == ext))
                .unwrap_or(false);
            if matches_ext {
                files.push(entry.path().to_path_buf());
            }
        }
    }

    files.sort();
    Ok(files)
}

/// 1-based display column of a char offset, counted in graphemes.
fn display_column(line: &str, char_offset: usize) -> usize {
    let prefix: String = line.chars().take(char_offset).collect();
    prefix.graphemes(true).count() + 1
}

fn cmd_find(query: &str, paths: &[PathBuf], case_sensitive: bool, config: &Config) -> Result<(), String> {
    let files = collect_files(paths, &config.extensions)?;
    let mut total = 0;

    for file in files {
        let content = fs::read_to_string(&file)
            .map_err(|e| format!("Failed to read '{}': {}", file.display(), e))?;

        for (line_no, line) in content.lines().enumerate() {
            for m in find_matches(line, query, case_sensitive) {
                println!(
                    "{}:{}:{}: {}",
                    file.display(),
                    line_no + 1,
                    display_column(line, m.start_index),
                    line.trim_end()
                );
                total += 1;
            }
        }
    }

    if total == 0 {
        return Err(format!("No matches for '{}'", query));
    }
    Ok(())
}

fn cmd_replace(
    search: &str,
    replace: &str,
    paths: &[PathBuf],
    case_sensitive: bool,
    dry_run: bool,
    config: &Config,
) -> Result<(), String> {
    let files = collect_files(paths, &config.extensions)?;
    let mut changed = 0;

    for file in files {
        let content = fs::read_to_string(&file)
            .map_err(|e| format!("Failed to read '{}': {}", file.display(), e))?;

        let replaced = safe_replace(&content, search, replace, case_sensitive);
        if replaced == content {
            continue;
        }

        if dry_run {
            println!("would change {}", file.display());
        } else {
            fs::write(&file, replaced)
                .map_err(|e| format!("Failed to write '{}': {}", file.display(), e))?;
            println!("changed {}", file.display());
        }
        changed += 1;
    }

    if changed == 0 {
        println!("nothing to change");
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    let config = Config::load();

    let result = match args.command {
        Commands::Find {
            query,
            paths,
            case_sensitive,
        } => cmd_find(
            &query,
            &paths,
            case_sensitive || config.case_sensitive,
            &config,
        ),
        Commands::Replace {
            search,
            replace,
            paths,
            case_sensitive,
            dry_run,
        } => cmd_replace(
            &search,
            &replace,
            &paths,
            case_sensitive || config.case_sensitive,
            dry_run,
            &config,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

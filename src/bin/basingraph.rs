use std::{env, process};

use basingraph::{BasinGraphError, GraphStore, PathSampleLoader};

#[derive(Clone, Debug, PartialEq, Eq)]
struct CommandLineConfig {
    database: String,
    min_data: String,
    ts_data: String,
    validate: bool,
    command: String,
}

impl CommandLineConfig {
    fn from_args(args: &[&str]) -> Result<Self, String> {
        let mut database = String::from("landscape.db");
        let mut min_data = String::from("min.data");
        let mut ts_data = String::from("ts.data");
        let mut validate = false;
        let mut command = String::from("status");
        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            match *arg {
                "--db" | "--database" => {
                    database = iter
                        .next()
                        .ok_or_else(|| "--db requires a value".to_string())?
                        .to_string();
                }
                "--min" => {
                    min_data = iter
                        .next()
                        .ok_or_else(|| "--min requires a value".to_string())?
                        .to_string();
                }
                "--ts" => {
                    ts_data = iter
                        .next()
                        .ok_or_else(|| "--ts requires a value".to_string())?
                        .to_string();
                }
                "--validate" => {
                    validate = true;
                }
                "--command" => {
                    command = iter
                        .next()
                        .ok_or_else(|| "--command requires a value".to_string())?
                        .to_string();
                }
                other if other.starts_with('-') => {
                    return Err(format!("unknown flag {other}"));
                }
                _ => {
                    command = arg.to_string();
                }
            }
        }
        Ok(Self {
            database,
            min_data,
            ts_data,
            validate,
            command,
        })
    }

    fn help() -> &'static str {
        "Usage: basingraph [--db PATH] [--min min.data] [--ts ts.data] [--validate] \
         [--command load|status|list-minima]\n\
         load resets the database before loading; status and list-minima do not.\n"
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("{}", CommandLineConfig::help());
        return;
    }
    let arg_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    let config = match CommandLineConfig::from_args(&arg_refs) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(2);
        }
    };

    if let Err(err) = run_command(&config) {
        eprintln!("command failed: {err}");
        process::exit(1);
    }
}

fn run_command(config: &CommandLineConfig) -> Result<(), BasinGraphError> {
    match config.command.as_str() {
        "load" => {
            let store = GraphStore::open(&config.database)?;
            let loader =
                PathSampleLoader::with_paths(&store, &config.min_data, &config.ts_data)
                    .validating(config.validate);
            let (minima, transition_states) = loader.load()?;
            println!("loaded minima={minima} transition_states={transition_states}");
            store.close()
        }
        "status" => {
            let store = GraphStore::open_existing(&config.database)?;
            let minima = store.number_of_minima()?;
            let transition_states = store.number_of_transition_states()?;
            println!("db={} minima={minima} transition_states={transition_states}", config.database);
            store.close()
        }
        "list-minima" => {
            let store = GraphStore::open_existing(&config.database)?;
            for minimum in store.minima(true)? {
                println!("{} {}", minimum.id, minimum.energy);
            }
            store.close()
        }
        other => Err(BasinGraphError::invalid_input(format!(
            "unknown command {other}"
        ))),
    }
}

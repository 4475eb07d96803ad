// Apply a data-activity preset to one activity instance from the command line.
//
// Usage:
//   cargo run --bin preset-import -- <db_path> <data_id> (--fullname <path> | --directory <name>) \
//       [--overwrite] [field_<n>=<existing id> ...]
//
// Creates the schema if the database is new. Notifications are written to the log,
// the import outcome is printed as JSON.

use clap::Parser;
use data_preset_importer::db::{init_schema, open_sqlite_connection};
use data_preset_importer::{
    logging, ConfigManager, ImportError, ImportRequest, PresetImporter, SqliteContentStore,
    SqliteDataRepository, TracingNotifier,
};
use std::sync::{Arc, Mutex};

#[derive(Parser, Debug)]
#[command(name = "preset-import", version, about = "Apply a preset to a data activity")]
struct Cli {
    /// SQLite database file
    db_path: String,

    /// Target activity instance id
    data_id: i64,

    /// Existing preset; relative paths resolve under the site presets directory
    #[arg(long, conflicts_with = "directory", required_unless_present = "directory")]
    fullname: Option<String>,

    /// Uploaded preset directory under <temp_dir>/forms
    #[arg(long)]
    directory: Option<String>,

    /// Overwrite every imported setting, not only templates and sort order
    #[arg(long)]
    overwrite: bool,

    /// Field mapping, e.g. field_0=12
    #[arg(value_parser = parse_mapping_arg)]
    mappings: Vec<(String, String)>,
}

impl Cli {
    fn request_params(&self) -> Vec<(String, String)> {
        let mut params = self.mappings.clone();
        if let Some(fullname) = &self.fullname {
            params.push(("fullname".to_string(), fullname.clone()));
        }
        if let Some(directory) = &self.directory {
            params.push(("directory".to_string(), directory.clone()));
        }
        params
    }
}

fn parse_mapping_arg(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if key.starts_with("field_") => {
            Ok((key.to_string(), value.to_string()))
        }
        _ => Err(format!("expected field_<n>=<id>, got '{}'", arg)),
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init();

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            match err.downcast_ref::<ImportError>() {
                Some(import_err) => eprintln!("{}", import_err.user_message()),
                None => eprintln!("{}", err),
            }
            std::process::exit(2);
        }
    }
}

/// 返回导入（含清理）是否成功
fn run(cli: &Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let conn = open_sqlite_connection(&cli.db_path)?;
    init_schema(&conn)?;
    let conn = Arc::new(Mutex::new(conn));

    let repo = Arc::new(SqliteDataRepository::from_connection(conn.clone()));
    let store = Arc::new(SqliteContentStore::from_connection(conn.clone()));
    let config = ConfigManager::from_connection(conn)?;

    let importer = PresetImporter::create_from_request(
        cli.data_id,
        ImportRequest::from_params(cli.request_params()),
        repo,
        store,
        &config,
        Arc::new(TracingNotifier),
    )?;

    if cli.mappings.is_empty() && importer.needs_mapping()? {
        eprintln!(
            "data {} already has fields; unmapped fields will be deleted",
            cli.data_id
        );
    }

    let outcome = importer.finish_import_process(cli.overwrite)?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    Ok(outcome.success)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_upload_with_mapping() {
        let cli = Cli::parse_from([
            "preset-import",
            "app.db",
            "3",
            "--directory",
            "abc123",
            "--overwrite",
            "field_0=12",
            "field_1=-1",
        ]);
        assert_eq!(cli.data_id, 3);
        assert!(cli.overwrite);
        assert_eq!(cli.fullname, None);

        let request = ImportRequest::from_params(cli.request_params());
        assert_eq!(request.directory.as_deref(), Some("abc123"));
        assert_eq!(request.field_mapping.target(0), Some(12));
        assert_eq!(request.field_mapping.target(1), None);
    }

    #[test]
    fn parse_existing_preset() {
        let cli = Cli::parse_from(["preset-import", "app.db", "3", "--fullname", "Books"]);
        assert_eq!(cli.fullname.as_deref(), Some("Books"));
        assert!(!cli.overwrite);
        assert!(cli.mappings.is_empty());
    }

    #[test]
    fn preset_location_is_required() {
        assert!(Cli::try_parse_from(["preset-import", "app.db", "3"]).is_err());
        assert!(Cli::try_parse_from([
            "preset-import",
            "app.db",
            "3",
            "--fullname",
            "Books",
            "--directory",
            "abc"
        ])
        .is_err());
    }

    #[test]
    fn mapping_argument_format() {
        assert_eq!(
            parse_mapping_arg("field_2=7"),
            Ok(("field_2".to_string(), "7".to_string()))
        );
        assert!(parse_mapping_arg("title=7").is_err());
        assert!(parse_mapping_arg("field_2").is_err());
    }
}

//! Load `.geoingest.toml` from the dump's directory (CLI only). Lib callers pass IngestOpts directly.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::Opts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GeoingestToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    db_path: Option<String>,
    workers: Option<usize>,
    ordered: Option<bool>,
    continue_on_error: Option<bool>,
    verbose: Option<bool>,
}

/// Load `.geoingest.toml` from `dir` if present. Returns None if file missing or unreadable.
pub(crate) fn load_geoingest_toml(dir: &Path) -> Option<GeoingestToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_geoingest_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

pub(crate) fn parse_geoingest_toml(s: &str) -> Result<GeoingestToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($section:expr, $opts:expr, $file_field:ident => $opts_field:ident) => {
        if let Some(v) = $section.$file_field {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI. dry_run is never in the file.
pub(crate) fn apply_file_to_opts(file: &GeoingestToml, opts: &mut Opts) {
    let section = &file.settings;
    if let Some(ref p) = section.db_path {
        opts.db_path = Some(PathBuf::from(p));
    }
    if let Some(w) = section.workers {
        opts.workers = Some(w);
    }
    apply_file_opt!(section, opts, ordered => ordered);
    apply_file_opt!(section, opts, continue_on_error => continue_on_error);
    apply_file_opt!(section, opts, verbose => verbose);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_values_fill_opts() {
        let file = parse_geoingest_toml(
            r#"
            [settings]
            db_path = "geo.db"
            workers = 500
            ordered = true
            "#,
        )
        .unwrap();
        let mut opts = Opts::default();
        apply_file_to_opts(&file, &mut opts);
        assert_eq!(opts.db_path, Some(PathBuf::from("geo.db")));
        assert_eq!(opts.workers, Some(500));
        assert!(opts.ordered);
        assert!(!opts.continue_on_error);
    }

    #[test]
    fn missing_section_changes_nothing() {
        let file = parse_geoingest_toml("").unwrap();
        let mut opts = Opts {
            verbose: true,
            ..Default::default()
        };
        apply_file_to_opts(&file, &mut opts);
        assert!(opts.verbose);
        assert_eq!(opts.workers, None);
    }

    #[test]
    fn wrong_type_is_an_error() {
        assert!(parse_geoingest_toml("[settings]\nworkers = \"many\"").is_err());
    }
}

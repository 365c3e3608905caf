// ABOUTME: One module per batch stage plus helpers they share.
// ABOUTME: Every stage takes Settings (and a Store when it touches the database) and returns a StageSummary.

pub mod export;
pub mod fetch;
pub mod images;
pub mod missing;
pub mod normalize;
pub mod overrides;
pub mod query;
pub mod reset;
pub mod seed;

use compendium_extract::image_refs;

use crate::settings::Settings;

/// Public-relative path of the first `<img>` in `html` whose local file exists.
pub(crate) fn existing_local_image(settings: &Settings, html: &str) -> Option<String> {
    image_refs(html).into_iter().find_map(|image| {
        let src = image.local_src()?;
        let relative = src.trim_start_matches('/').to_string();
        settings.public_file(&relative).is_file().then_some(relative)
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::Path;
    use std::time::Duration;

    use compendium_extract::{Fields, Record, Source, TableProfile};

    use crate::settings::{Settings, DEFAULT_URL_TEMPLATE};

    pub fn settings(root: &Path) -> Settings {
        Settings {
            root: root.to_path_buf(),
            db_path: root.join("boons.db"),
            sources: vec![Source::new("Zeus")],
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            concurrency: 2,
            timeout: Duration::from_secs(5),
            user_agent: "test".to_string(),
            overrides_path: None,
            profile: TableProfile::default(),
        }
    }

    pub fn record(source: &str, idx: u32, name: &str, primary: &str) -> Record {
        let fields = Fields {
            primary: primary.to_string(),
            ..Default::default()
        };
        Record::new(source, idx, name, compendium_extract::slugify(name), fields, None).unwrap()
    }

    /// Writes a file under the public directory, creating parents.
    pub fn put_public_file(settings: &Settings, local_path: &str, contents: &str) {
        let path = settings.public_file(local_path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }
}

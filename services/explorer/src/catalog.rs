//! Directory scans over the cache and the plots directory.

use std::path::Path;

use explorer_common::dateid::dates_from_filenames;
use explorer_common::{DateId, ExplorerError, ExplorerResult, ImageAvailable, PlotImageName};
use tracing::debug;

/// File names in `dir`, in no particular order.
pub async fn list_file_names(dir: &Path) -> ExplorerResult<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| ExplorerError::io(dir, e))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ExplorerError::io(dir, e))?
    {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

/// Sorted dataset dates found in the k-means inputs directory.
pub async fn list_dates(inputs_dir: &Path) -> ExplorerResult<Vec<DateId>> {
    let names = list_file_names(inputs_dir).await?;
    Ok(dates_from_filenames(names))
}

/// Plot images currently present, sorted by name.
///
/// Only entries whose name mentions `png` and follows the plot naming
/// convention are returned.
pub async fn list_plot_images(plots_dir: &Path) -> ExplorerResult<Vec<(String, PlotImageName)>> {
    let mut images: Vec<(String, PlotImageName)> = list_file_names(plots_dir)
        .await?
        .into_iter()
        .filter(|name| name.contains("png"))
        .filter_map(|name| match PlotImageName::parse(&name) {
            Ok(image) => Some((name, image)),
            Err(e) => {
                debug!(file = %name, error = %e, "Skipping unrecognised plot file");
                None
            }
        })
        .collect();
    images.sort();
    Ok(images)
}

/// One `image available` event per plot image on disk.
pub async fn plot_events(plots_dir: &Path) -> ExplorerResult<Vec<ImageAvailable>> {
    Ok(list_plot_images(plots_dir)
        .await?
        .iter()
        .map(|(name, image)| ImageAvailable::for_file(name, image))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_dates() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["input_20210122", "input_20210110", "KMEANS_INPUT", "notes.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }

        let dates = list_dates(dir.path()).await.unwrap();
        let ids: Vec<&str> = dates.iter().map(DateId::as_str).collect();
        assert_eq!(ids, vec!["20210110", "20210122"]);
    }

    #[tokio::test]
    async fn test_list_dates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_dates(&dir.path().join("absent")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_plot_events() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "20210122_classes__2.png",
            "20210110_classes__3.png",
            "leftover.png",
            "20210110_classes__3.csv",
        ] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }

        let events = plot_events(dir.path()).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id.as_str(), "20210110");
        assert_eq!(events[0].classes, "3");
        assert_eq!(events[1].id.as_str(), "20210122");
        assert!(events[1].html.contains("/plotz/20210122_classes__2.png"));
    }
}

//! Plot jobs and the file naming conventions around them.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dateid::{DateId, INPUT_PREFIX};
use crate::error::{ExplorerError, ExplorerResult};

/// Separator between the date id and the class count in plot image names.
const CLASSES_SEPARATOR: &str = "_classes__";

/// Separator between the input name and the class count in output directories.
const CLUSTERS_SEPARATOR: &str = "_cl_";

/// A request to render one scatter plot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlotJob {
    pub dateid: DateId,
    pub num_classes: u32,
}

impl PlotJob {
    pub fn new(dateid: DateId, num_classes: u32) -> Self {
        Self {
            dateid,
            num_classes,
        }
    }

    /// CSV file consumed by the plotting script, e.g. `20210110_cl_3.csv`.
    pub fn csv_filename(&self) -> String {
        format!("{}{}{}.csv", self.dateid, CLUSTERS_SEPARATOR, self.num_classes)
    }

    /// Image the plotting script is expected to produce.
    pub fn image_name(&self) -> PlotImageName {
        PlotImageName {
            dateid: self.dateid.clone(),
            num_classes: self.num_classes,
        }
    }

    /// Positional arguments passed to the plotting script.
    pub fn script_args(&self) -> [String; 2] {
        [self.dateid.to_string(), self.num_classes.to_string()]
    }
}

impl fmt::Display for PlotJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} classes)", self.dateid, self.num_classes)
    }
}

/// A k-means output directory: `input_<dateid>_cl_<numClasses>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct KmeansOutput {
    pub dateid: DateId,
    pub num_classes: u32,
}

impl KmeansOutput {
    /// Parse an output directory name.
    pub fn from_dir_name(name: &str) -> ExplorerResult<Self> {
        let invalid = || ExplorerError::InvalidOutputDir(name.to_string());

        let rest = name.strip_prefix(INPUT_PREFIX).ok_or_else(invalid)?;
        let (date, classes) = rest.split_once(CLUSTERS_SEPARATOR).ok_or_else(invalid)?;
        let dateid = DateId::parse(date).map_err(|_| invalid())?;
        let num_classes = parse_class_count(classes).ok_or_else(invalid)?;

        Ok(Self {
            dateid,
            num_classes,
        })
    }

    pub fn dir_name(&self) -> String {
        format!(
            "{}{}{}{}",
            INPUT_PREFIX, self.dateid, CLUSTERS_SEPARATOR, self.num_classes
        )
    }

    /// Per-point class assignments, relative to the outputs directory.
    pub fn points_file(&self, outputs_dir: &Path) -> PathBuf {
        outputs_dir
            .join(self.dir_name())
            .join(format!("{}-points.txt", self.num_classes))
    }

    /// Point measurements for this date, relative to the inputs directory.
    pub fn input_file(&self, inputs_dir: &Path) -> PathBuf {
        inputs_dir.join(format!("{}{}", INPUT_PREFIX, self.dateid))
    }

    pub fn job(&self) -> PlotJob {
        PlotJob::new(self.dateid.clone(), self.num_classes)
    }
}

/// Name of a rendered plot: `<dateid>_classes__<numClasses>.png`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlotImageName {
    pub dateid: DateId,
    pub num_classes: u32,
}

impl PlotImageName {
    pub fn parse(name: &str) -> ExplorerResult<Self> {
        let invalid = || ExplorerError::InvalidPlotName(name.to_string());

        let (date, rest) = name.split_once(CLASSES_SEPARATOR).ok_or_else(invalid)?;
        let classes = rest.split('.').next().ok_or_else(invalid)?;
        let dateid = DateId::parse(date).map_err(|_| invalid())?;
        let num_classes = parse_class_count(classes).ok_or_else(invalid)?;

        Ok(Self {
            dateid,
            num_classes,
        })
    }

    pub fn file_name(&self) -> String {
        format!("{}{}{}.png", self.dateid, CLASSES_SEPARATOR, self.num_classes)
    }
}

impl fmt::Display for PlotImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Push event telling the browser a plot image can be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAvailable {
    pub id: DateId,
    pub classes: String,
    pub html: String,
}

impl ImageAvailable {
    /// Event name used on the push channel.
    pub const EVENT: &'static str = "image available";

    /// Build the event for an image file as it is named on disk.
    pub fn for_file(file_name: &str, image: &PlotImageName) -> Self {
        Self {
            id: image.dateid.clone(),
            classes: image.num_classes.to_string(),
            html: format!(
                "<h2>{}</h2><img src=\"/plotz/{}\">",
                image.dateid.pretty(),
                file_name
            ),
        }
    }

    pub fn for_image(image: &PlotImageName) -> Self {
        Self::for_file(&image.file_name(), image)
    }

    /// Wire form: `{"event": "image available", "data": {...}}`.
    pub fn to_message(&self) -> serde_json::Value {
        serde_json::json!({
            "event": Self::EVENT,
            "data": self,
        })
    }
}

fn parse_class_count(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok().filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> DateId {
        DateId::parse(s).unwrap()
    }

    #[test]
    fn test_output_dir_name() {
        let out = KmeansOutput::from_dir_name("input_20210110_cl_3").unwrap();
        assert_eq!(out.dateid, date("20210110"));
        assert_eq!(out.num_classes, 3);
        assert_eq!(out.dir_name(), "input_20210110_cl_3");

        assert!(KmeansOutput::from_dir_name("KMEANS_INPUT_cl_3").is_err());
        assert!(KmeansOutput::from_dir_name("input_20210110").is_err());
        assert!(KmeansOutput::from_dir_name("input_20210110_cl_").is_err());
        assert!(KmeansOutput::from_dir_name("input_20210110_cl_0").is_err());
        assert!(KmeansOutput::from_dir_name("input_20210110_cl_x").is_err());
    }

    #[test]
    fn test_output_paths() {
        let out = KmeansOutput::from_dir_name("input_20210110_cl_4").unwrap();
        assert_eq!(
            out.points_file(Path::new("cache/kmeans_outputs")),
            PathBuf::from("cache/kmeans_outputs/input_20210110_cl_4/4-points.txt")
        );
        assert_eq!(
            out.input_file(Path::new("cache/kmeans_inputs")),
            PathBuf::from("cache/kmeans_inputs/input_20210110")
        );
    }

    #[test]
    fn test_job_names() {
        let job = PlotJob::new(date("20210110"), 3);
        assert_eq!(job.csv_filename(), "20210110_cl_3.csv");
        assert_eq!(job.image_name().file_name(), "20210110_classes__3.png");
        assert_eq!(job.script_args(), ["20210110".to_string(), "3".to_string()]);
    }

    #[test]
    fn test_plot_image_name() {
        let img = PlotImageName::parse("20210110_classes__5.png").unwrap();
        assert_eq!(img.dateid, date("20210110"));
        assert_eq!(img.num_classes, 5);

        assert!(PlotImageName::parse("20210110.png").is_err());
        assert!(PlotImageName::parse("2021_classes__5.png").is_err());
        assert!(PlotImageName::parse("20210110_classes__.png").is_err());
    }

    #[test]
    fn test_image_available_event() {
        let img = PlotImageName::parse("20210110_classes__2.png").unwrap();
        let event = ImageAvailable::for_image(&img);
        assert_eq!(event.classes, "2");
        assert_eq!(
            event.html,
            "<h2>10 styczeń 2021</h2><img src=\"/plotz/20210110_classes__2.png\">"
        );

        let msg = event.to_message();
        assert_eq!(msg["event"], "image available");
        assert_eq!(msg["data"]["id"], "20210110");
        assert_eq!(msg["data"]["classes"], "2");
    }
}

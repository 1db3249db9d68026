//! Plot requestor: turns k-means outputs into plot jobs.
//!
//! For every `input_<dateid>_cl_<n>` output directory the point
//! measurements and the per-point class assignments are joined into a
//! CSV file for the plotting script, and a job is queued.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use explorer_common::{ExplorerError, ExplorerResult, KmeansOutput, PlotJob};
use tracing::{debug, error, info, instrument};

use crate::catalog::list_file_names;
use crate::config::ExplorerConfig;
use crate::queue::PlotQueue;

/// First line of every generated CSV file.
pub const CSV_HEADER: &str = "VH,VV,CLASS\n";

/// Join point measurements with their class labels.
///
/// `points` holds one `<vh> <vv>` pair per line and `classes` one label
/// per line. Lines are matched by index. Point lines lacking either value
/// are skipped; a point without a matching class line gets an empty label.
pub fn join_points_and_classes(points: &str, classes: &str) -> String {
    let classes: Vec<&str> = classes.split('\n').collect();
    let mut output = String::from(CSV_HEADER);

    for (index, point) in points.split('\n').enumerate() {
        let mut values = point.split(' ');
        let (vh, vv) = match (values.next(), values.next()) {
            (Some(vh), Some(vv)) if !vh.is_empty() && !vv.is_empty() => (vh, vv),
            _ => continue,
        };

        output.push_str(vh);
        output.push(',');
        output.push_str(vv);
        output.push(',');
        output.push_str(classes.get(index).copied().unwrap_or(""));
        output.push('\n');
    }

    output
}

pub struct PlotRequestor {
    inputs_dir: PathBuf,
    outputs_dir: PathBuf,
    csv_dir: PathBuf,
    queue: Arc<PlotQueue>,
}

impl PlotRequestor {
    pub fn new(config: &ExplorerConfig, queue: Arc<PlotQueue>) -> Self {
        Self {
            inputs_dir: config.kmeans_inputs_dir(),
            outputs_dir: config.kmeans_outputs_dir(),
            csv_dir: config.input_files_dir(),
            queue,
        }
    }

    /// K-means output directories, sorted by date then class count.
    pub async fn discover_outputs(&self) -> ExplorerResult<Vec<KmeansOutput>> {
        let mut outputs: Vec<KmeansOutput> = Vec::new();

        for name in list_file_names(&self.outputs_dir).await? {
            let output = match KmeansOutput::from_dir_name(&name) {
                Ok(output) => output,
                Err(e) => {
                    debug!(entry = %name, error = %e, "Skipping unrelated output entry");
                    continue;
                }
            };

            let is_dir = tokio::fs::metadata(self.outputs_dir.join(&name))
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false);
            if is_dir {
                outputs.push(output);
            } else {
                debug!(entry = %name, "Skipping non-directory output entry");
            }
        }

        outputs.sort();
        Ok(outputs)
    }

    /// Write the CSV for one output and queue its plot.
    #[instrument(skip(self, output), fields(dateid = %output.dateid, classes = output.num_classes))]
    pub async fn request_plot(&self, output: &KmeansOutput) -> ExplorerResult<PlotJob> {
        let points = read_text(&output.input_file(&self.inputs_dir)).await?;
        let classes = read_text(&output.points_file(&self.outputs_dir)).await?;

        let csv = join_points_and_classes(&points, &classes);

        tokio::fs::create_dir_all(&self.csv_dir)
            .await
            .map_err(|e| ExplorerError::io(&self.csv_dir, e))?;

        let job = output.job();
        let csv_path = self.csv_dir.join(job.csv_filename());
        tokio::fs::write(&csv_path, csv)
            .await
            .map_err(|e| ExplorerError::io(&csv_path, e))?;

        debug!(path = %csv_path.display(), "Wrote plot input");
        self.queue.push(job.clone());
        Ok(job)
    }

    /// Request plots for every discovered output. Returns the number queued.
    pub async fn request_all(&self) -> ExplorerResult<usize> {
        let outputs = self.discover_outputs().await?;
        let mut queued = 0;

        for output in &outputs {
            match self.request_plot(output).await {
                Ok(_) => queued += 1,
                Err(e) => error!(
                    dateid = %output.dateid,
                    classes = output.num_classes,
                    error = %e,
                    "Failed to request plot"
                ),
            }
        }

        info!(discovered = outputs.len(), queued, "Plot requests queued");
        Ok(queued)
    }
}

async fn read_text(path: &Path) -> ExplorerResult<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ExplorerError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_join_matched_lines() {
        let csv = join_points_and_classes("1.5 2.5\n3.5 4.5\n", "0\n1\n");
        assert_eq!(csv, "VH,VV,CLASS\n1.5,2.5,0\n3.5,4.5,1\n");
    }

    #[test]
    fn test_join_skips_incomplete_points() {
        let csv = join_points_and_classes("1 2\n3\n\n5 6", "a\nb\nc\nd");
        assert_eq!(csv, "VH,VV,CLASS\n1,2,a\n5,6,d\n");
    }

    #[test]
    fn test_join_missing_class_is_empty() {
        let csv = join_points_and_classes("1 2\n3 4", "7");
        assert_eq!(csv, "VH,VV,CLASS\n1,2,7\n3,4,\n");
    }

    #[test]
    fn test_join_empty_points() {
        assert_eq!(join_points_and_classes("", "1\n2"), CSV_HEADER);
    }

    fn fixture() -> (tempfile::TempDir, ExplorerConfig) {
        let root = tempfile::tempdir().unwrap();
        let config = ExplorerConfig::rooted_at(root.path());

        let inputs = config.kmeans_inputs_dir();
        let outputs = config.kmeans_outputs_dir();
        fs::create_dir_all(&inputs).unwrap();
        fs::create_dir_all(outputs.join("input_20210110_cl_2")).unwrap();
        fs::create_dir_all(outputs.join("input_20210110_cl_3")).unwrap();
        fs::create_dir_all(outputs.join("KMEANS_INPUT_cl_2")).unwrap();
        fs::write(outputs.join("input_20210122_cl_2"), "not a dir").unwrap();

        fs::write(inputs.join("input_20210110"), "0.1 0.2\n0.3 0.4\n").unwrap();
        fs::write(outputs.join("input_20210110_cl_2/2-points.txt"), "1\n2\n").unwrap();
        fs::write(outputs.join("input_20210110_cl_3/3-points.txt"), "3\n1\n").unwrap();

        (root, config)
    }

    #[tokio::test]
    async fn test_discover_outputs() {
        let (_root, config) = fixture();
        let requestor = PlotRequestor::new(&config, Arc::new(PlotQueue::new()));

        let outputs = requestor.discover_outputs().await.unwrap();
        let names: Vec<String> = outputs.iter().map(KmeansOutput::dir_name).collect();
        assert_eq!(names, vec!["input_20210110_cl_2", "input_20210110_cl_3"]);
    }

    #[tokio::test]
    async fn test_request_all_writes_csv_and_queues() {
        let (_root, config) = fixture();
        let queue = Arc::new(PlotQueue::new());
        let requestor = PlotRequestor::new(&config, queue.clone());

        assert_eq!(requestor.request_all().await.unwrap(), 2);
        assert_eq!(queue.len(), 2);

        let csv = fs::read_to_string(config.input_files_dir().join("20210110_cl_3.csv")).unwrap();
        assert_eq!(csv, "VH,VV,CLASS\n0.1,0.2,3\n0.3,0.4,1\n");

        let job = queue.pop().unwrap();
        assert_eq!(job.dateid.as_str(), "20210110");
        assert_eq!(job.num_classes, 2);
    }

    #[tokio::test]
    async fn test_missing_points_file_is_not_fatal() {
        let (_root, config) = fixture();
        fs::remove_file(config.kmeans_outputs_dir().join("input_20210110_cl_2/2-points.txt"))
            .unwrap();

        let queue = Arc::new(PlotQueue::new());
        let requestor = PlotRequestor::new(&config, queue.clone());

        assert_eq!(requestor.request_all().await.unwrap(), 1);
        assert_eq!(queue.pop().unwrap().num_classes, 3);
    }
}

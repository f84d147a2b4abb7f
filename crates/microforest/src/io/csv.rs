//! CSV model replay format.
//!
//! A model file is a sequence of builder calls, one per line:
//!
//! ```text
//! # comment
//! f,<n_features>
//! c,<n_classes>
//! l,<class>
//! n,<feature>,<threshold>,<left>,<right>
//! r,<root>
//! ```
//!
//! `left`, `right` and `root` use the signed encoding of
//! [`NodeRef::from_raw`](crate::NodeRef::from_raw): non-negative values are
//! node ids, negative values `r` refer to leaf `-(r + 1)`. Records are
//! applied in file order, so ids are assigned exactly as if the calls were
//! made directly. `f` and `c` records are applied after the last line has
//! been read.
//!
//! Leaves are only ever reached through negative references. Some exporters
//! write a leaf as a node with a negative feature index; such `n` records
//! are refused with [`LoadError::Parse`], since the feature field must be a
//! `u16`. Convert them to `l` records and negative references first.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::str::FromStr;

use crate::config::{ConfigError, ForestConfig};
use crate::error::ForestError;
use crate::repr::{ClassLabel, FeatureIndex, Forest, SplitValue};

// =============================================================================
// Error types
// =============================================================================

/// Error type for model loading.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    /// A record was well-formed but the builder call failed.
    #[error("line {line}: {source}")]
    Append {
        line: usize,
        #[source]
        source: ForestError,
    },
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Forest(#[from] ForestError),
}

/// Record counts from one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub nodes: usize,
    pub trees: usize,
    pub leaves: usize,
    pub n_features: Option<usize>,
    pub n_classes: Option<usize>,
}

// =============================================================================
// Record parsing
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Record<T> {
    Features(usize),
    Classes(usize),
    Root(i32),
    Leaf(ClassLabel),
    Node {
        feature: FeatureIndex,
        threshold: T,
        left: i32,
        right: i32,
    },
}

fn parse_field<F: FromStr>(fields: &[&str], idx: usize, name: &str) -> Result<F, String> {
    let raw = fields[idx];
    raw.parse()
        .map_err(|_| format!("invalid value for {name}: {raw:?}"))
}

fn expect_fields(fields: &[&str], expected: usize) -> Result<(), String> {
    if fields.len() != expected {
        return Err(format!(
            "record '{}' expects {} fields, got {}",
            fields[0],
            expected,
            fields.len()
        ));
    }
    Ok(())
}

/// Parse one line. `Ok(None)` for blank lines and comments.
fn parse_record<T: SplitValue>(line: &str) -> Result<Option<Record<T>>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let record = match fields[0] {
        "f" => {
            expect_fields(&fields, 2)?;
            Record::Features(parse_field(&fields, 1, "n_features")?)
        }
        "c" => {
            expect_fields(&fields, 2)?;
            Record::Classes(parse_field(&fields, 1, "n_classes")?)
        }
        "r" => {
            expect_fields(&fields, 2)?;
            Record::Root(parse_field(&fields, 1, "root")?)
        }
        "l" => {
            expect_fields(&fields, 2)?;
            Record::Leaf(parse_field(&fields, 1, "class")?)
        }
        "n" => {
            expect_fields(&fields, 5)?;
            let threshold = T::parse_threshold(fields[2])
                .ok_or_else(|| format!("invalid {} threshold: {:?}", T::KIND, fields[2]))?;
            Record::Node {
                feature: parse_field(&fields, 1, "feature")?,
                threshold,
                left: parse_field(&fields, 3, "left")?,
                right: parse_field(&fields, 4, "right")?,
            }
        }
        other => return Err(format!("unknown record kind {other:?}")),
    };
    Ok(Some(record))
}

// =============================================================================
// Loading
// =============================================================================

/// Replay a CSV model into an existing forest.
///
/// Stops at the first bad line; records before it have already been applied.
pub fn load_into<T: SplitValue, R: BufRead>(
    forest: &mut Forest<T>,
    reader: R,
) -> Result<LoadSummary, LoadError> {
    let mut summary = LoadSummary::default();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let record = parse_record::<T>(&line).map_err(|message| LoadError::Parse {
            line: line_no,
            message,
        })?;
        let Some(record) = record else {
            continue;
        };

        let appended = match record {
            Record::Features(n) => {
                summary.n_features = Some(n);
                Ok(())
            }
            Record::Classes(n) => {
                summary.n_classes = Some(n);
                Ok(())
            }
            Record::Root(raw) => forest.add_raw_root(raw).map(|_| summary.trees += 1),
            Record::Leaf(class) => forest.add_leaf(class).map(|_| summary.leaves += 1),
            Record::Node {
                feature,
                threshold,
                left,
                right,
            } => forest
                .add_raw_node(left, right, feature, threshold)
                .map(|_| summary.nodes += 1),
        };
        appended.map_err(|source| LoadError::Append {
            line: line_no,
            source,
        })?;
    }

    if summary.n_features.is_some() || summary.n_classes.is_some() {
        forest.set_feature_class_counts(
            summary.n_features.unwrap_or(forest.n_features()),
            summary.n_classes.unwrap_or(forest.n_classes()),
        );
    }

    tracing::debug!(
        nodes = summary.nodes,
        trees = summary.trees,
        leaves = summary.leaves,
        "loaded model records"
    );

    Ok(summary)
}

/// Allocate a forest from `config` and replay a CSV model into it.
///
/// With `config.strict`, the loaded forest is validated before it is
/// returned.
///
/// # Example
///
/// ```
/// use microforest::{io::csv::load_model, FloatForest, ForestConfig};
///
/// let model = "f,1\nc,2\nl,0\nl,1\nn,0,0.5,-1,-2\nr,0\n";
/// let config = ForestConfig::builder().max_trees(1).max_nodes(1).max_leaves(2).build().unwrap();
/// let forest: FloatForest = load_model(model.as_bytes(), &config).unwrap();
/// assert_eq!(forest.predict(&[0.7]).unwrap(), 1);
/// ```
pub fn load_model<T: SplitValue, R: BufRead>(
    reader: R,
    config: &ForestConfig,
) -> Result<Forest<T>, LoadError> {
    config.validate()?;
    let mut forest = Forest::from_config(config)?;
    load_into(&mut forest, reader)?;

    if config.strict {
        if let Err(err) = forest.validate() {
            tracing::warn!(error = %err, "loaded model failed strict validation");
            return Err(ForestError::from(err).into());
        }
    }
    Ok(forest)
}

/// [`load_model`] from a file on disk.
pub fn load_model_file<T: SplitValue>(
    path: impl AsRef<Path>,
    config: &ForestConfig,
) -> Result<Forest<T>, LoadError> {
    let file = File::open(path)?;
    load_model(BufReader::new(file), config)
}

// =============================================================================
// Writing
// =============================================================================

/// Write a forest as CSV records that [`load_model`] replays into an
/// identical forest.
///
/// Leaves are written first, then nodes, then roots, each in id order.
pub fn write_model<T: SplitValue, W: Write>(forest: &Forest<T>, mut writer: W) -> io::Result<()> {
    let unencodable =
        || io::Error::new(io::ErrorKind::InvalidData, "reference does not fit a signed 32-bit id");

    if forest.n_features() > 0 {
        writeln!(writer, "f,{}", forest.n_features())?;
    }
    if forest.n_classes() > 0 {
        writeln!(writer, "c,{}", forest.n_classes())?;
    }
    for class in forest.leaves() {
        writeln!(writer, "l,{class}")?;
    }
    for node in forest.nodes() {
        let left = node.left.to_raw().ok_or_else(unencodable)?;
        let right = node.right.to_raw().ok_or_else(unencodable)?;
        writeln!(
            writer,
            "n,{},{},{},{}",
            node.feature, node.threshold, left, right
        )?;
    }
    for root in forest.roots() {
        let raw = root.to_raw().ok_or_else(unencodable)?;
        writeln!(writer, "r,{raw}")?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::{FloatForest, NodeRef, QuantizedForest, ValidationError};

    fn config(max_trees: usize, max_nodes: usize, max_leaves: usize) -> ForestConfig {
        ForestConfig::builder()
            .max_trees(max_trees)
            .max_nodes(max_nodes)
            .max_leaves(max_leaves)
            .build()
            .unwrap()
    }

    const TWO_TREES: &str = "\
# two stumps on different features
f,2
c,3

l,0
l,2
n,0,0.5,-1,-2
n,1,-1.25,-2,-1
r,0
r,1
";

    #[test]
    fn parse_node_record() {
        let record = parse_record::<f32>("n, 3, 0.25, 1, -4").unwrap();
        assert_eq!(
            record,
            Some(Record::Node {
                feature: 3,
                threshold: 0.25,
                left: 1,
                right: -4
            })
        );
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        assert_eq!(parse_record::<f32>("   ").unwrap(), None);
        assert_eq!(parse_record::<f32>("# l,3").unwrap(), None);
    }

    #[test]
    fn load_matches_direct_calls() {
        let loaded: FloatForest = load_model(TWO_TREES.as_bytes(), &config(2, 2, 2)).unwrap();

        let mut direct = FloatForest::new(2, 2, 2).unwrap();
        direct.add_leaf(0).unwrap();
        direct.add_leaf(2).unwrap();
        direct.add_raw_node(-1, -2, 0, 0.5).unwrap();
        direct.add_raw_node(-2, -1, 1, -1.25).unwrap();
        direct.add_raw_root(0).unwrap();
        direct.add_raw_root(1).unwrap();
        direct.set_feature_class_counts(2, 3);

        assert_eq!(loaded.nodes(), direct.nodes());
        assert_eq!(loaded.roots(), direct.roots());
        assert_eq!(loaded.leaves(), direct.leaves());
        assert_eq!(loaded.meta(), direct.meta());

        for features in [[0.0, 0.0], [1.0, -2.0], [0.2, 5.0], [0.9, -1.25]] {
            assert_eq!(
                loaded.predict(&features).unwrap(),
                direct.predict(&features).unwrap()
            );
        }
    }

    #[test]
    fn summary_counts_records() {
        let mut forest = FloatForest::new(2, 2, 2).unwrap();
        let summary = load_into(&mut forest, TWO_TREES.as_bytes()).unwrap();
        assert_eq!(
            summary,
            LoadSummary {
                nodes: 2,
                trees: 2,
                leaves: 2,
                n_features: Some(2),
                n_classes: Some(3)
            }
        );
    }

    #[test]
    fn quantized_model() {
        let model = "n,0,100,-1,-3\nr,0\nr,-2\n";
        let forest: QuantizedForest = load_model(model.as_bytes(), &config(2, 1, 0)).unwrap();
        assert_eq!(forest.root(1), Some(NodeRef::Leaf(1)));
        // votes {0, 1} below the threshold, {2, 1} at or above it
        assert_eq!(forest.predict(&[99]).unwrap(), 0);
        assert_eq!(forest.predict(&[100]).unwrap(), 1);
    }

    #[test]
    fn parse_errors_report_line() {
        let cases = [
            ("l,0\nx,1\n", 2, "unknown record kind"),
            ("l,0\nl,1\nn,0,0.5,-1\n", 3, "expects 5 fields"),
            ("n,0,abc,-1,-2\n", 1, "threshold"),
            ("l,300\n", 1, "invalid value for class"),
            ("\n# header\nr,-\n", 3, "invalid value for root"),
        ];
        for (model, expected_line, fragment) in cases {
            let err = load_model::<f32, _>(model.as_bytes(), &config(1, 1, 2)).unwrap_err();
            match err {
                LoadError::Parse { line, message } => {
                    assert_eq!(line, expected_line, "{model:?}");
                    assert!(message.contains(fragment), "{message}");
                }
                other => panic!("expected parse error for {model:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn negative_feature_leaf_nodes_are_refused() {
        let err = load_model::<f32, _>("n,-1,0,-1,-1\nr,0\n".as_bytes(), &config(1, 1, 1))
            .unwrap_err();
        match err {
            LoadError::Parse { line, message } => {
                assert_eq!(line, 1);
                assert!(message.contains("invalid value for feature"), "{message}");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn capacity_error_reports_line() {
        let err = load_model::<f32, _>(TWO_TREES.as_bytes(), &config(1, 2, 2)).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Append {
                line: 10,
                source: ForestError::CapacityExceeded { .. }
            }
        ));
        assert!(err.to_string().starts_with("line 10: max trees reached"));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ForestConfig {
            max_trees: 0,
            max_nodes: 1,
            max_leaves: 0,
            strict: false,
        };
        let err = load_model::<f32, _>("".as_bytes(), &config).unwrap_err();
        assert!(matches!(err, LoadError::Config(ConfigError::InvalidMaxTrees)));
    }

    #[test]
    fn strict_load_validates() {
        let model = "l,0\nn,0,1.0,0,-1\nr,0\n";
        let mut config = config(1, 1, 1);

        let forest: FloatForest = load_model(model.as_bytes(), &config).unwrap();
        assert_eq!(forest.n_nodes(), 1);

        config.strict = true;
        let err = load_model::<f32, _>(model.as_bytes(), &config).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Forest(ForestError::Validation(ValidationError::CycleDetected {
                tree: 0,
                node: 0
            }))
        ));
    }

    #[test]
    fn written_model_reloads_identically() {
        let first: FloatForest = load_model(TWO_TREES.as_bytes(), &config(2, 2, 2)).unwrap();

        let mut out = Vec::new();
        write_model(&first, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("f,2\nc,3\nl,0\nl,2\n"));

        let reloaded: FloatForest = load_model(text.as_bytes(), &config(2, 2, 2)).unwrap();
        assert_eq!(reloaded.nodes(), first.nodes());
        assert_eq!(reloaded.roots(), first.roots());
        assert_eq!(reloaded.leaves(), first.leaves());
    }

    #[test]
    fn write_rejects_unencodable_reference() {
        let mut forest = FloatForest::new(1, 0, 0).unwrap();
        forest.add_root(NodeRef::Leaf(u32::MAX)).unwrap();
        let err = write_model(&forest, Vec::new()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}

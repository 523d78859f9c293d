/// Thresholds and limits shared by every stage of a run.
///
/// Built once from the command line and passed by reference; nothing mutates
/// it after parsing starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Threads handed to the external BAM converter
    pub max_threads: u16,
    /// Reads must have fewer segments than this to produce breakpoints
    pub max_split: u32,
    pub min_map_quality: u16,
    pub min_identity: f32,
    /// Bytes captured per SAM field; the rest of the field is dropped
    pub max_field_length: usize,
    /// Program used to turn BAM into SAM text
    pub converter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_threads: 1,
            max_split: 10,
            min_map_quality: 80,
            min_identity: 0.80,
            max_field_length: crate::sam::DEFAULT_FIELD_CAPACITY,
            converter: "sambamba".to_string(),
        }
    }
}

impl Config {
    /// Arguments for the converter invocation on `path`
    pub fn converter_args(&self, path: &str) -> Vec<String> {
        vec![
            "view".to_string(),
            "-t".to_string(),
            self.max_threads.to_string(),
            path.to_string(),
        ]
    }
}

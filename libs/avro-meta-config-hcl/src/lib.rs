use avro_meta::config::{ConfigParser, ToolConfig};
use avro_meta::MetaError;

pub struct HclParser;

impl ConfigParser for HclParser {
    fn extensions(&self) -> &[&str] {
        &["hcl"]
    }

    fn parse(&self, content: &str) -> Result<ToolConfig, MetaError> {
        hcl::from_str(content).map_err(|e| MetaError::Config(e.to_string()))
    }
}

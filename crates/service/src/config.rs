use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Results per query; `None` ranks every indexed chunk
    pub top_k: Option<usize>,
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.top_k == Some(0) {
            return Err("top_k must be > 0 when set".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_top_k_rejected() {
        assert!(SearchConfig::default().validate().is_ok());
        assert!(SearchConfig { top_k: Some(5) }.validate().is_ok());
        assert!(SearchConfig { top_k: Some(0) }.validate().is_err());
    }
}

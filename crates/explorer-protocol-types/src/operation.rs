use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of operations a restricted context may invoke.
///
/// Wire names are fixed; adding a variant is the only way to widen the
/// bridge surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Current Buck project directory.
    #[serde(rename = "current-buck-dir")]
    CurrentBuckDir,
    /// Pick a new Buck project directory via a folder dialog.
    #[serde(rename = "select-buck-dir")]
    SelectBuckDir,
    /// `buck2 status`.
    #[serde(rename = "buck2-status")]
    Status,
    /// `buck2 targets`.
    #[serde(rename = "buck2-targets")]
    Targets,
    /// `buck2 cquery --output-all-attributes`.
    #[serde(rename = "buck2-attributes")]
    Attributes,
    /// `buck2 audit providers`.
    #[serde(rename = "buck2-providers")]
    Providers,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::CurrentBuckDir,
        Operation::SelectBuckDir,
        Operation::Status,
        Operation::Targets,
        Operation::Attributes,
        Operation::Providers,
    ];

    /// Name used on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::CurrentBuckDir => "current-buck-dir",
            Self::SelectBuckDir => "select-buck-dir",
            Self::Status => "buck2-status",
            Self::Targets => "buck2-targets",
            Self::Attributes => "buck2-attributes",
            Self::Providers => "buck2-providers",
        }
    }

    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.wire_name() == name)
    }

    /// Whether the operation takes `(target, host, mode)` arguments.
    pub fn takes_query_args(self) -> bool {
        matches!(self, Self::Targets | Self::Attributes | Self::Providers)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_operations_serialize() {
        let operations = vec![
            (Operation::CurrentBuckDir, "current-buck-dir"),
            (Operation::SelectBuckDir, "select-buck-dir"),
            (Operation::Status, "buck2-status"),
            (Operation::Targets, "buck2-targets"),
            (Operation::Attributes, "buck2-attributes"),
            (Operation::Providers, "buck2-providers"),
        ];

        assert_eq!(operations.len(), Operation::ALL.len());
        for (operation, expected_name) in operations {
            let json = serde_json::to_string(&operation).unwrap();
            assert_eq!(
                json,
                format!("\"{}\"", expected_name),
                "Operation {:?} should serialize to {}",
                operation,
                expected_name
            );
            assert_eq!(operation.wire_name(), expected_name);
            assert_eq!(operation.to_string(), expected_name);
        }
    }

    #[test]
    fn test_wire_name_lookup_is_closed() {
        for op in Operation::ALL {
            assert_eq!(Operation::from_wire_name(op.wire_name()), Some(op));
        }
        assert_eq!(Operation::from_wire_name("buck2-build"), None);
        assert_eq!(Operation::from_wire_name("Buck2-Status"), None);
        assert_eq!(Operation::from_wire_name(""), None);
    }

    #[test]
    fn test_query_arg_operations() {
        let with_args: Vec<_> = Operation::ALL
            .into_iter()
            .filter(|op| op.takes_query_args())
            .collect();
        assert_eq!(
            with_args,
            vec![Operation::Targets, Operation::Attributes, Operation::Providers]
        );
    }
}

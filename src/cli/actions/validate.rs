use crate::schema::collections;
use anyhow::{Context, Result, anyhow, bail};
use mongodb::bson::{Bson, Document};
use serde_json::Value;
use std::{fs, path::PathBuf};

#[derive(Debug)]
pub struct Args {
    pub collection: String,
    pub file: PathBuf,
}

/// Parse one JSON document, or an array of them, accepting extended JSON
/// (`{"$date": ..}`, `{"$oid": ..}`).
///
/// # Errors
/// Returns an error if the input is not JSON or holds something other than documents.
pub fn parse_documents(input: &str) -> Result<Vec<Document>> {
    let value: Value = serde_json::from_str(input).context("invalid JSON")?;

    let values = match value {
        Value::Array(values) => values,
        value => vec![value],
    };

    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| match Bson::try_from(value) {
            Ok(Bson::Document(doc)) => Ok(doc),
            Ok(other) => Err(anyhow!("document {index}: expected an object, found {other}")),
            Err(err) => Err(anyhow!("document {index}: {err}")),
        })
        .collect()
}

/// Execute the validate action.
/// # Errors
/// Returns an error if the file cannot be read or any document breaks the schema.
pub fn execute(args: &Args) -> Result<()> {
    let spec = collections::find(&args.collection)?;

    let input = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let documents = parse_documents(&input)
        .with_context(|| format!("Failed to parse {}", args.file.display()))?;

    let mut invalid = 0;
    for (index, doc) in documents.iter().enumerate() {
        let violations = spec.violations(doc);
        if violations.is_empty() {
            println!("document {index}: ok");
        } else {
            invalid += 1;
            for violation in violations {
                println!("document {index}: {violation}");
            }
        }
    }

    if invalid > 0 {
        bail!(
            "{invalid} of {} documents do not match the {} schema",
            documents.len(),
            spec.name
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, content: &str) -> Result<PathBuf> {
        let path = std::env::temp_dir().join(format!("authdb-{}-{name}", std::process::id()));
        fs::File::create(&path)?.write_all(content.as_bytes())?;
        Ok(path)
    }

    #[test]
    fn parse_extended_json_dates() -> Result<()> {
        let docs = parse_documents(
            r#"{"userId": "u1", "createdAt": {"$date": "2024-01-01T00:00:00Z"}}"#,
        )?;
        assert_eq!(docs.len(), 1);
        assert!(matches!(docs[0].get("createdAt"), Some(Bson::DateTime(_))));
        Ok(())
    }

    #[test]
    fn parse_rejects_scalars() {
        assert!(parse_documents("[1]").is_err());
        assert!(parse_documents("not json").is_err());
    }

    #[test]
    fn valid_two_factor_file() -> Result<()> {
        let path = write_temp(
            "2fa-ok.json",
            r#"[{"userId": "u1", "method": "TOTP", "enabled": true, "secret": "JBSWY3DPEHPK3PXP"}]"#,
        )?;

        let result = execute(&Args {
            collection: "two_factor_auth".to_string(),
            file: path.clone(),
        });
        fs::remove_file(path)?;

        result
    }

    #[test]
    fn sms_method_fails() -> Result<()> {
        let path = write_temp(
            "2fa-sms.json",
            r#"{"userId": "u1", "method": "SMS", "enabled": true}"#,
        )?;

        let result = execute(&Args {
            collection: "two_factor_auth".to_string(),
            file: path.clone(),
        });
        fs::remove_file(path)?;

        let err = result.err().context("expected SMS to be rejected")?;
        assert!(err.to_string().contains("1 of 1 documents"));
        Ok(())
    }

    #[test]
    fn missing_file_fails() {
        let result = execute(&Args {
            collection: "user_sessions".to_string(),
            file: PathBuf::from("/nonexistent/authdb/session.json"),
        });
        assert!(result.is_err());
    }
}

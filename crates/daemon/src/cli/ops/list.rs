use std::fmt;

use clap::Args;

use common::document::DocumentRecord;
use common::loadable::Loadable;
use docvault_daemon::state::StateError;

#[derive(Args, Debug, Clone)]
pub struct List;

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("state error: {0}")]
    State(#[from] StateError),
    #[error("failed to load documents: {0}")]
    Failed(String),
}

/// Plain-text rendering of a document listing.
struct DocumentTable<'a>(&'a Loadable<Vec<DocumentRecord>>);

impl fmt::Display for DocumentTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Loadable::Pending => write!(f, "Loading documents..."),
            Loadable::Failed(reason) => write!(f, "Failed to load documents: {}", reason),
            Loadable::Ready(documents) if documents.is_empty() => {
                write!(f, "No documents found")
            }
            Loadable::Ready(documents) => {
                let lines = documents
                    .iter()
                    .map(|doc| {
                        format!(
                            "{} {} [{}] {}",
                            doc.id,
                            doc.name,
                            doc.mime_type,
                            doc.created_at.date()
                        )
                    })
                    .collect::<Vec<_>>();
                write!(f, "{}", lines.join("\n"))
            }
        }
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for List {
    type Error = ListError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let client = ctx.session_client(&state)?;

        let documents: Loadable<_> = client.list_documents().await.into();
        if let Loadable::Failed(reason) = &documents {
            return Err(ListError::Failed(reason.clone()));
        }
        Ok(DocumentTable(&documents).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use common::crypto::SecretKey;
    use common::prelude::WalletIdentity;
    use common::testkit::sample_document;

    #[test]
    fn test_table_states() {
        assert_eq!(
            DocumentTable(&Loadable::Pending).to_string(),
            "Loading documents..."
        );
        assert_eq!(
            DocumentTable(&Loadable::Ready(vec![])).to_string(),
            "No documents found"
        );
        assert_eq!(
            DocumentTable(&Loadable::Failed("offline".into())).to_string(),
            "Failed to load documents: offline"
        );
    }

    #[test]
    fn test_table_lists_each_document() {
        let owner = WalletIdentity::new(SecretKey::generate().unwrap().public());
        let first = DocumentRecord::create(&owner, sample_document("a.pdf"));
        let second = DocumentRecord::create(&owner, sample_document("b.txt"));

        let table = DocumentTable(&Loadable::Ready(vec![first.clone(), second])).to_string();
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(&first.id.to_string()));
        assert!(lines[0].contains("a.pdf"));
        assert!(lines[1].contains("b.txt"));
    }
}

// One-shot actions selected with `--action`. Arguments are checked up
// front (`ActionRequest::from_cli`) so a missing flag never costs a
// request; `run` then talks to the API and prints the result.

use crate::api::FileStoreClient;
use crate::cli::{Action, Cli};
use crate::display::{write_document_details, write_store_table};
use crate::error::UsageError;
use crate::upload::{upload_folder, UploadOptions};
use anyhow::{bail, Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A fully specified action, ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    List,
    Create { display_name: String },
    Delete { display_name: String },
    Upload { display_name: String, folder: PathBuf },
    ListDocuments { display_name: String },
    DeleteDocument { name: String },
}

pub fn usage(action: Action) -> &'static str {
    match action {
        Action::List => "filestore --action=list",
        Action::Delete => "filestore --action=delete --storage-name=<name>",
        Action::Upload => "filestore --action=upload --storage-name=<name> --folder=<path>",
        Action::Create => "filestore --action=create --storage-name=<name>",
        Action::ListDocuments => "filestore --action=list-documents --storage-name=<name>",
        Action::DeleteDocument => "filestore --action=delete-document --document=<document-name>",
    }
}

impl ActionRequest {
    pub fn from_cli(action: Action, cli: &Cli) -> Result<Self, UsageError> {
        let missing = || UsageError::new(usage(action));
        let storage_name = || {
            cli.storage_name
                .clone()
                .filter(|s| !s.is_empty())
                .ok_or_else(missing)
        };

        Ok(match action {
            Action::List => ActionRequest::List,
            Action::Create => ActionRequest::Create {
                display_name: storage_name()?,
            },
            Action::Delete => ActionRequest::Delete {
                display_name: storage_name()?,
            },
            Action::Upload => ActionRequest::Upload {
                display_name: storage_name()?,
                folder: cli.folder.clone().ok_or_else(missing)?,
            },
            Action::ListDocuments => ActionRequest::ListDocuments {
                display_name: storage_name()?,
            },
            // Older invocations passed the document name through --storage-name.
            Action::DeleteDocument => ActionRequest::DeleteDocument {
                name: cli
                    .document
                    .clone()
                    .filter(|s| !s.is_empty())
                    .map_or_else(storage_name, Ok)?,
            },
        })
    }
}

pub fn run(
    client: &FileStoreClient,
    request: &ActionRequest,
    options: &UploadOptions,
    out: &mut dyn Write,
) -> Result<()> {
    match request {
        ActionRequest::List => list(client, out).context("Error listing storages"),
        ActionRequest::Create { display_name } => {
            create(client, display_name, out).context("Error creating storage")
        }
        ActionRequest::Delete { display_name } => {
            delete(client, display_name, out).context("Error deleting storage")
        }
        ActionRequest::Upload {
            display_name,
            folder,
        } => upload(client, display_name, folder, options, out).context("Error during upload"),
        ActionRequest::ListDocuments { display_name } => {
            list_documents(client, display_name, out).context("Error listing documents")
        }
        ActionRequest::DeleteDocument { name } => {
            delete_document(client, name, out).context("Error deleting document")
        }
    }
}

fn list(client: &FileStoreClient, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "Listing file storages...")?;
    let stores = client.list_stores()?;
    if stores.is_empty() {
        writeln!(out, "No File Stores found.")?;
        return Ok(());
    }
    write_store_table(out, &stores)?;
    Ok(())
}

fn create(client: &FileStoreClient, display_name: &str, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "Creating storage '{}'...", display_name)?;
    let store = client.create_store(display_name)?;
    if store.name.is_empty() {
        bail!(
            "server did not return a store name: {}",
            serde_json::to_string(&store)?
        );
    }
    writeln!(
        out,
        "Storage '{}' created successfully with name: {}",
        display_name, store.name
    )?;
    Ok(())
}

fn delete(client: &FileStoreClient, display_name: &str, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "Deleting storage '{}'...", display_name)?;
    match client.get_store_by_display_name(display_name)? {
        Some(store) => {
            client.delete_store(&store.name)?;
            writeln!(out, "Storage '{}' deleted successfully.", display_name)?;
        }
        None => writeln!(out, "Storage '{}' not found.", display_name)?,
    }
    Ok(())
}

fn upload(
    client: &FileStoreClient,
    display_name: &str,
    folder: &Path,
    options: &UploadOptions,
    out: &mut dyn Write,
) -> Result<()> {
    if !folder.is_dir() {
        bail!("Folder '{}' not found.", folder.display());
    }
    writeln!(
        out,
        "Uploading files from '{}' to '{}'...",
        folder.display(),
        display_name
    )?;
    let store = match client.get_store_by_display_name(display_name)? {
        Some(store) => store,
        None => bail!("Storage '{}' not found.", display_name),
    };
    let summary = upload_folder(client, &store.name, folder, options, out)?;
    if !summary.failed.is_empty() {
        bail!("{} file(s) failed to upload", summary.failed.len());
    }
    Ok(())
}

fn list_documents(client: &FileStoreClient, display_name: &str, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "Listing documents in storage '{}'...", display_name)?;
    let store = match client.get_store_by_display_name(display_name)? {
        Some(store) => store,
        None => bail!("Storage '{}' not found.", display_name),
    };
    let documents = client.list_documents(&store.name)?;
    if documents.is_empty() {
        writeln!(out, "No documents found in storage '{}'.", display_name)?;
        return Ok(());
    }
    writeln!(out, "Found {} document(s):\n", documents.len())?;
    for doc in &documents {
        write_document_details(out, doc)?;
    }
    Ok(())
}

fn delete_document(client: &FileStoreClient, name: &str, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "Deleting document '{}'...", name)?;
    client.delete_document(name)?;
    writeln!(out, "Document '{}' deleted successfully.", name)?;
    Ok(())
}

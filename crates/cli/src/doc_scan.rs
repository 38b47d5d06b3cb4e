//! Doc scan session and media commands.

use std::fs;
use std::path::Path;

use idconnect_common::services::Media;
use idconnect_common::ConnectClient;

use crate::api::read_json;
use crate::error::CliError;

pub fn create_session(client: &ConnectClient, spec_file: &Path) -> Result<(), CliError> {
    let specification = read_json(spec_file)?;
    let result = client.doc_scan().create_session(&specification)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

pub fn get_session(client: &ConnectClient, session_id: &str) -> Result<(), CliError> {
    let session = client.doc_scan().retrieve_session(session_id)?;
    println!("{}", serde_json::to_string_pretty(&session)?);
    Ok(())
}

pub fn delete_session(client: &ConnectClient, session_id: &str) -> Result<(), CliError> {
    client.doc_scan().delete_session(session_id)?;
    log::info!("Deleted session {}", session_id);
    Ok(())
}

/// Downloads media to `output`, or prints it as a data URL when no path is given.
pub fn get_media(
    client: &ConnectClient,
    session_id: &str,
    media_id: &str,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let media = client.doc_scan().get_media_content(session_id, media_id)?;
    match output {
        Some(path) => {
            write_media(&media, path)?;
            log::info!(
                "Wrote {} bytes of {} to {}",
                media.content().len(),
                media.mime_type(),
                path.display()
            );
        }
        None => println!("{}", media.data_url()),
    }
    Ok(())
}

pub(crate) fn write_media(media: &Media, path: &Path) -> Result<(), CliError> {
    fs::write(path, media.content())?;
    Ok(())
}

pub fn delete_media(
    client: &ConnectClient,
    session_id: &str,
    media_id: &str,
) -> Result<(), CliError> {
    client.doc_scan().delete_media_content(session_id, media_id)?;
    log::info!("Deleted media {} from session {}", media_id, session_id);
    Ok(())
}

pub fn supported_documents(client: &ConnectClient) -> Result<(), CliError> {
    let supported = client.doc_scan().supported_documents()?;
    println!("{}", serde_json::to_string_pretty(&supported)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_media() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join("selfie.jpg");
        let media = Media::new("image/jpeg", b"jpeg".to_vec());

        write_media(&media, &path).expect("should write media");
        assert_eq!(fs::read(&path).expect("should read media"), b"jpeg");
    }

    #[test]
    fn test_write_media_to_missing_dir() {
        let media = Media::new("image/jpeg", b"jpeg".to_vec());
        let err = write_media(&media, Path::new("/nonexistent/dir/selfie.jpg"))
            .expect_err("should fail");
        assert!(matches!(err, CliError::Io(_)));
    }
}

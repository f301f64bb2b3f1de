//! Multipart form readers for the pages that accept file uploads.

use axum::extract::Multipart;

use crate::error::PageError;

#[derive(Debug, Default)]
pub struct PostFormData {
    pub text: String,
    pub group: Option<i64>,
    pub image: Option<Vec<u8>>,
}

#[derive(Debug, Default)]
pub struct AccountFormData {
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<Vec<u8>>,
}

fn multipart_err(err: axum::extract::multipart::MultipartError) -> PageError {
    PageError::Internal(anyhow::anyhow!("multipart: {err}"))
}

pub async fn read_post_form(multipart: &mut Multipart) -> Result<PostFormData, PageError> {
    let mut form = PostFormData::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_err)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("text") => form.text = field.text().await.map_err(multipart_err)?,
            Some("group") => {
                let raw = field.text().await.map_err(multipart_err)?;
                form.group = raw.trim().parse().ok();
            }
            Some("image") => {
                let bytes = field.bytes().await.map_err(multipart_err)?;
                if !bytes.is_empty() {
                    form.image = Some(bytes.to_vec());
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

fn blank_to_none(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub async fn read_account_form(multipart: &mut Multipart) -> Result<AccountFormData, PageError> {
    let mut form = AccountFormData::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_err)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("username") => form.username = field.text().await.map_err(multipart_err)?,
            Some("email") => form.email = field.text().await.map_err(multipart_err)?,
            Some("first_name") => {
                form.first_name = blank_to_none(field.text().await.map_err(multipart_err)?)
            }
            Some("last_name") => {
                form.last_name = blank_to_none(field.text().await.map_err(multipart_err)?)
            }
            Some("avatar") => {
                let bytes = field.bytes().await.map_err(multipart_err)?;
                if !bytes.is_empty() {
                    form.avatar = Some(bytes.to_vec());
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

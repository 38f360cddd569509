use anyhow::Result;
use noticeboard_dal::announcement::AnnouncementPublic;
use reqwest::Url;
use serde_json::json;
use tracing::info;

use crate::announcement_url;

pub async fn create_announcement(
    client: &reqwest::Client,
    base_url: &Url,
    owner: &str,
    title: &str,
    description: &str,
) -> Result<i64> {
    let payload = json!({"owner": owner, "title": title, "description": description});
    let api_url = base_url.join("announcement/")?;

    let response = client.post(api_url).json(&payload).send().await?;
    info!("Create response: {:#?}", response);
    assert_eq!(response.status().as_u16(), 200);

    let body: serde_json::Value = response.json().await?;
    let id = body
        .get("id")
        .and_then(|id| id.as_i64())
        .ok_or_else(|| anyhow::anyhow!("Missing id in response"))?;
    Ok(id)
}

pub async fn get_announcement(
    client: &reqwest::Client,
    base_url: &Url,
    id: i64,
) -> Result<AnnouncementPublic> {
    let response = client.get(announcement_url(base_url, id)?).send().await?;
    assert!(response.status().is_success());
    let record: AnnouncementPublic = response.json().await?;
    Ok(record)
}

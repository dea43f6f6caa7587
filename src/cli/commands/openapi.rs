use anyhow::Result;
use utoipa::OpenApi;

use crate::schemas::ApiDoc;

pub fn print_openapi() -> Result<()> {
    let yaml = serde_yaml::to_string(&ApiDoc::openapi())?;
    println!("{yaml}");
    Ok(())
}

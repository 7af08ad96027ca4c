use anyhow::Context;
use clap::Args;

use crate::cli::utils::output_courses;
use crate::cli::OutputFormat;
use crate::database::models::Course;
use crate::filter::{Filter, FilterData};

#[derive(Args, Debug)]
pub struct BrowseArgs {
    #[arg(long, default_value = "http://localhost:3000", help = "Base URL of the API server")]
    pub url: String,

    #[arg(long, help = "Case-insensitive title search")]
    pub search: Option<String>,

    #[arg(long, help = "Category name, or All")]
    pub category: Option<String>,

    #[arg(long, help = "Level (Beginner, Intermediate, Advanced, All Levels), or All")]
    pub level: Option<String>,

    #[arg(long, help = "price-asc, price-desc, newest (default) or oldest")]
    pub sort: Option<String>,
}

impl BrowseArgs {
    fn filter_data(&self) -> FilterData {
        FilterData {
            search: self.search.clone(),
            category: self.category.clone(),
            level: self.level.clone(),
            sort: self.sort.clone(),
        }
    }
}

pub async fn handle(args: BrowseArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    // Reject a bad sort key before touching the network
    let filter = Filter::assign(&args.filter_data())?;

    let courses = fetch_courses(&args.url).await?;
    tracing::debug!("Fetched {} published courses", courses.len());

    output_courses(&output_format, &filter.apply(&courses))
}

async fn fetch_courses(base_url: &str) -> anyhow::Result<Vec<Course>> {
    let url = format!("{}/api/courses", base_url.trim_end_matches('/'));
    let response = reqwest::get(&url)
        .await
        .with_context(|| format!("failed to reach {}", url))?
        .error_for_status()?;

    response.json().await.context("unexpected course list payload")
}

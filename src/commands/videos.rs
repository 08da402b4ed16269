//! Video catalog commands: list, batch import, edit, delete

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use prettytable::{row, Table};

use super::{or_dash, print_json, truncate, Context};
use crate::api::types::{VideoRecord, VideoType};
use crate::catalog::{extract_video_id, ImportOrchestrator, ImportRows, VideoCatalog};
use crate::error::{ApiError, Result};

fn catalog(ctx: &Context) -> VideoCatalog {
    VideoCatalog::new(ctx.client.clone(), ctx.config.catalog.list_limit)
}

/// `adminctl videos list`
///
/// # Errors
///
/// Returns error for an unknown type, a missing session or a failed request
pub async fn list_videos(ctx: &Context, video_type: Option<&str>, json: bool) -> Result<()> {
    let catalog = catalog(ctx);

    let lists: Vec<(VideoType, Vec<VideoRecord>)> = match video_type {
        Some(raw) => {
            let video_type: VideoType = raw.parse()?;
            vec![(video_type, catalog.refresh(video_type).await?)]
        }
        None => {
            let (leaders, products) = catalog.refresh_all().await?;
            vec![(VideoType::Leaders, leaders), (VideoType::Products, products)]
        }
    };

    if json {
        let map: serde_json::Map<String, serde_json::Value> = lists
            .iter()
            .map(|(video_type, videos)| {
                serde_json::to_value(videos).map(|value| (video_type.to_string(), value))
            })
            .collect::<std::result::Result<_, _>>()?;
        return print_json(&map);
    }

    for (video_type, videos) in &lists {
        if videos.is_empty() {
            println!("{}", format!("No {} videos.", video_type).yellow());
            continue;
        }
        println!("\n{} videos ({}):\n", video_type, videos.len());
        videos_table(*video_type, videos).printstd();
    }
    println!();
    Ok(())
}

/// Gather import candidates the way the import form does
///
/// Each argument is pasted into its own row (multi-URL arguments fan out
/// into several rows), followed by the file contents, if any.
pub fn collect_urls(args: &[String], file_text: Option<&str>) -> Vec<String> {
    let mut rows = ImportRows::new();
    for text in args.iter().map(String::as_str).chain(file_text) {
        let last = rows.len() - 1;
        if !rows.rows()[last].trim().is_empty() {
            rows.add_row();
        }
        rows.paste(rows.len() - 1, text);
    }
    rows.urls()
}

fn read_url_file(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    Ok(std::fs::read_to_string(path)?)
}

/// `adminctl videos import`
///
/// # Errors
///
/// Returns error for an empty batch, a product import without category, a
/// missing session or a failed request
pub async fn import_videos(
    ctx: &Context,
    urls: &[String],
    file: Option<&Path>,
    video_type: &str,
    category: Option<&str>,
) -> Result<()> {
    let video_type: VideoType = video_type.parse()?;
    let file_text = file.map(read_url_file).transpose()?;
    let candidates = collect_urls(urls, file_text.as_deref());

    let unrecognized = candidates
        .iter()
        .filter(|url| extract_video_id(url).is_none())
        .count();
    if unrecognized > 0 {
        tracing::warn!(count = unrecognized, "Some URLs do not look like video links; the backend will decide");
    }

    let orchestrator = ImportOrchestrator::new(Arc::new(catalog(ctx)));
    let report = orchestrator.submit(&candidates, video_type, category).await?;

    println!("{}", report.summary().green());
    if !report.created.is_empty() {
        videos_table(video_type, &report.created).printstd();
    }
    if report.list_refreshed {
        let total = orchestrator.catalog().videos(video_type).len();
        println!("{} list now has {} videos.", video_type, total);
    } else {
        println!(
            "{}",
            format!("Could not refresh the {} list; run `adminctl videos list`.", video_type).yellow()
        );
    }
    Ok(())
}

/// `adminctl videos edit`
///
/// Fields not given keep their current values.
///
/// # Errors
///
/// Returns error for an unknown type or id, a blank title, a missing
/// session or a failed request
pub async fn edit_video(
    ctx: &Context,
    video_type: &str,
    id: &str,
    title: Option<&str>,
    description: Option<&str>,
    category: Option<&str>,
) -> Result<()> {
    let video_type: VideoType = video_type.parse()?;
    let catalog = catalog(ctx);
    catalog.refresh(video_type).await?;

    let current = catalog.find(video_type, id).ok_or_else(|| {
        ApiError::ValidationFailed(format!("No {} video with id {}", video_type, id))
    })?;
    if category.is_some() && !video_type.requires_category() {
        tracing::warn!("Ignoring --category: only product videos have a category");
    }

    let videos = catalog
        .edit(
            video_type,
            id,
            title.unwrap_or(&current.title),
            description.unwrap_or(current.description.as_deref().unwrap_or_default()),
            category.or(current.category.as_deref()),
        )
        .await?;

    match videos.iter().find(|video| video.id.as_str() == id) {
        Some(updated) => println!("{}", format!("Updated \"{}\"", updated.title).green()),
        None => println!("{}", "Saved; the video is no longer listed.".yellow()),
    }
    Ok(())
}

/// `adminctl videos delete`
///
/// # Errors
///
/// Returns error for an unknown type, a missing session or a failed request
pub async fn delete_video(ctx: &Context, video_type: &str, id: &str) -> Result<()> {
    let video_type: VideoType = video_type.parse()?;
    let videos = catalog(ctx).delete(video_type, id).await?;
    println!(
        "{}",
        format!("Deleted {} video {} ({} remaining)", video_type, id, videos.len()).green()
    );
    Ok(())
}

/// Table of catalog entries
pub fn videos_table(video_type: VideoType, videos: &[VideoRecord]) -> Table {
    let mut table = Table::new();
    if video_type.requires_category() {
        table.add_row(row!["ID", "Title", "Category", "Watch"]);
    } else {
        table.add_row(row!["ID", "Title", "Watch"]);
    }
    for video in videos {
        let title = truncate(&video.title, 50);
        if video_type.requires_category() {
            table.add_row(row![
                video.id,
                title,
                or_dash(video.category.as_deref()),
                video.embed_url()
            ]);
        } else {
            table.add_row(row![video.id, title, video.embed_url()]);
        }
    }
    table
}

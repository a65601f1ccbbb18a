use crate::Result;
use crate::model::{Category, RepoCollection, RepoRecord};
use crate::reports;
use camino::Utf8Path;
use ohno::IntoAppError;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};

const LOG_TARGET: &str = "ranking";

const SUMMARY_FILE: &str = "ranking.md";
const CATEGORY_DIR: &str = "categories";
const INDEX_FILE: &str = "index.json";

/// How many of a category's top records contribute representative topics.
const TOPIC_SAMPLE_RECORDS: usize = 3;
const MAX_REPRESENTATIVE_TOPICS: usize = 5;

#[derive(Debug, Serialize)]
struct CategoryReport<'a> {
    category: Category,
    repos: Vec<&'a RepoRecord>,
}

#[derive(Debug, Serialize)]
struct IndexEntry {
    category: Category,
    file: String,
    topics: Vec<String>,
}

/// Write the per-run artifacts for an already ranked collection: the flat
/// top-N Markdown summary, plus a `categories/` directory holding one JSON
/// file per non-empty category and the category index.
///
/// Every file is a whole-file replacement; nothing is appended or patched.
///
/// # Errors
///
/// Returns an error if the output directory or any artifact cannot be
/// written.
pub fn write_artifacts(collection: &RepoCollection, output_dir: &Utf8Path, markdown_limit: usize) -> Result<()> {
    let category_dir = output_dir.join(CATEGORY_DIR);
    fs::create_dir_all(&category_dir).into_app_err_with(|| format!("unable to create output directory '{category_dir}'"))?;

    let summary_path = output_dir.join(SUMMARY_FILE);
    let table = reports::render_ranked_table(&collection.repos, markdown_limit);
    fs::write(&summary_path, &table).into_app_err_with(|| format!("unable to write ranking summary '{summary_path}'"))?;

    let mut index = Vec::new();
    for category in Category::ALL {
        let repos: Vec<&RepoRecord> = collection.repos.iter().filter(|r| r.category == Some(category)).collect();
        if repos.is_empty() {
            continue;
        }

        let file_name = format!("{}.json", category.slug());
        let topics = representative_topics(&repos);
        write_json(&category_dir.join(&file_name), &CategoryReport { category, repos })?;

        index.push(IndexEntry { category, file: file_name, topics });
    }

    write_json(&category_dir.join(INDEX_FILE), &index)?;

    log::debug!(target: LOG_TARGET, "Wrote ranking artifacts to '{output_dir}' ({} categories)", index.len());
    Ok(())
}

/// First-seen topics of a category's top records, as a rough label for what
/// the category contains this run.
fn representative_topics(repos: &[&RepoRecord]) -> Vec<String> {
    let mut topics = Vec::new();
    for repo in repos.iter().take(TOPIC_SAMPLE_RECORDS) {
        for topic in &repo.topics {
            if topics.len() == MAX_REPRESENTATIVE_TOPICS {
                return topics;
            }
            if !topics.contains(topic) {
                topics.push(topic.clone());
            }
        }
    }
    topics
}

fn write_json<T: Serialize>(path: &Utf8Path, value: &T) -> Result<()> {
    let file = File::create(path).into_app_err_with(|| format!("unable to create output file '{path}'"))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).into_app_err_with(|| format!("unable to write output file '{path}'"))?;
    writer.flush().into_app_err_with(|| format!("unable to flush output file '{path}'"))?;
    Ok(())
}

//! `techdocs list`: what the registry currently exposes.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use techdocs_core::{group_by_category, CategoryGroup, TechniqueRecord};
use techdocs_sync::Pipeline;

use super::Project;

/// Arguments for `techdocs list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    pub fn run(self, project: &Project) -> Result<()> {
        let pipeline = Pipeline::new(project.root.clone(), project.config.clone())
            .context("failed to set up the documentation pipeline")?;
        let records = pipeline.records().context("technique discovery failed")?;
        let groups = group_by_category(&records, &project.config.registry.category_order);

        if self.json {
            return print_json(&groups);
        }
        print_table(&groups);
        Ok(())
    }
}

#[derive(Serialize)]
struct ListJson<'a> {
    total: usize,
    categories: Vec<CategoryJson<'a>>,
}

#[derive(Serialize)]
struct CategoryJson<'a> {
    name: &'a str,
    title: String,
    techniques: &'a [TechniqueRecord],
}

#[derive(Tabled)]
struct TechniqueRow {
    #[tabled(rename = "key")]
    key: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "version")]
    version: String,
    #[tabled(rename = "class")]
    class: String,
    #[tabled(rename = "module")]
    module: String,
}

fn print_json(groups: &[CategoryGroup]) -> Result<()> {
    let payload = ListJson {
        total: groups.iter().map(|g| g.records.len()).sum(),
        categories: groups
            .iter()
            .map(|g| CategoryJson {
                name: g.category.0.as_str(),
                title: g.category.title(),
                techniques: &g.records,
            })
            .collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize technique list")?
    );
    Ok(())
}

fn print_table(groups: &[CategoryGroup]) {
    let total: usize = groups.iter().map(|g| g.records.len()).sum();
    println!("{total} techniques in {} categories", groups.len());

    for group in groups {
        println!("\n{}", group.category.title().bold());
        let rows: Vec<TechniqueRow> = group
            .records
            .iter()
            .map(|r| TechniqueRow {
                key: r.key.to_string(),
                name: r.display_name.clone(),
                version: r.version.clone(),
                class: r.implementing_type.clone(),
                module: r.source_module.clone(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }
}

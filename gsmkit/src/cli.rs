//! The command line interface.
use crate::log;
use ::log::info;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use gsmkit_core::project::Project;
use gsmkit_core::testing::runner::TestRunner;
use std::path::{Path, PathBuf};

/// Design and test genome scale metabolic models.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Commands,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Run the model tests against every model, condition and design of a project.
    Test {
        /// Path to the project directory.
        project_dir: PathBuf,
    },
    /// List the designs available to a project.
    Designs {
        /// Path to the project directory.
        project_dir: PathBuf,
    },
    /// Summarise the models of a project.
    Info {
        /// Path to the project directory.
        project_dir: PathBuf,
        /// Model to summarise, the default model if not given.
        #[arg(short, long)]
        model: Option<String>,
    },
    /// Write a design's model as COBRA JSON.
    Export {
        /// Path to the project directory.
        project_dir: PathBuf,
        /// Id of the design.
        design: String,
        /// File to write.
        output: PathBuf,
        /// Model the design is applied to, the default model if not given.
        #[arg(short, long)]
        model: Option<String>,
    },
}

impl Commands {
    fn execute(self) -> Result<()> {
        match self {
            Self::Test { project_dir } => handle_test_command(&project_dir),
            Self::Designs { project_dir } => handle_designs_command(&project_dir),
            Self::Info { project_dir, model } => handle_info_command(&project_dir, model.as_deref()),
            Self::Export {
                project_dir,
                design,
                output,
                model,
            } => handle_export_command(&project_dir, &design, &output, model.as_deref()),
        }
    }
}

/// Parse CLI arguments and run the command
pub fn run_cli() -> Result<()> {
    Cli::parse().command.execute()
}

/// Open a project, apply its settings and start the logger
fn open_project(project_dir: &Path) -> Result<Project> {
    let project = Project::open(project_dir)
        .with_context(|| format!("Failed to open project {}", project_dir.display()))?;
    let log_level = project.settings().and_then(|s| s.log_level.as_deref());
    log::init(log_level).context("Failed to initialise logging.")?;
    if let Some(settings) = project.settings() {
        settings.apply();
    }
    Ok(project)
}

/// Handle the `test` command.
pub fn handle_test_command(project_dir: &Path) -> Result<()> {
    let project = open_project(project_dir)?;
    let report = TestRunner::with_default_tests().run(&project);
    println!("{}", report);
    if !report.is_success() {
        bail!(
            "{} assertions failed and {} errors were logged",
            report.failed(),
            report.errors()
        );
    }
    Ok(())
}

/// Handle the `designs` command.
pub fn handle_designs_command(project_dir: &Path) -> Result<()> {
    let project = open_project(project_dir)?;
    for design in project.designs().iter() {
        match &design.parent {
            Some(parent) => println!("{} ({}), parent {}", design.id, design.name, parent),
            None => println!("{} ({})", design.id, design.name),
        }
        if !design.description.is_empty() {
            println!("    {}", design.description);
        }
    }
    Ok(())
}

/// Handle the `info` command.
pub fn handle_info_command(project_dir: &Path, model: Option<&str>) -> Result<()> {
    let project = open_project(project_dir)?;
    if !project.description().is_empty() {
        println!("{}", project.description());
    }
    let loaded = project.load_model(model).context("Failed to load model")?;
    println!("Model {}", loaded.id.as_deref().unwrap_or("<unnamed>"));
    println!("    {} reactions", loaded.reactions.len());
    println!("    {} metabolites", loaded.metabolites.len());
    println!("    {} genes", loaded.genes.len());
    for gene in loaded.genes.values() {
        let reactions = loaded.gene_reactions(&gene.id)?;
        println!("        {}: {}", gene, reactions.join(", "));
    }
    println!("    {} exchanges", loaded.exchanges().count());
    println!("Medium");
    for (id, uptake) in loaded.medium() {
        println!("    {}: {}", id, uptake);
    }
    println!("Objective ({:?})", loaded.objective_sense);
    for (id, coefficient) in &loaded.objective {
        println!("    {}: {}", id, coefficient);
    }
    println!("Conditions");
    for name in project.conditions().keys() {
        println!("    {}", name);
    }
    println!("Designs");
    for id in project.designs().ids() {
        println!("    {}", id);
    }
    Ok(())
}

/// Handle the `export` command.
pub fn handle_export_command(
    project_dir: &Path,
    design: &str,
    output: &Path,
    model: Option<&str>,
) -> Result<()> {
    let project = open_project(project_dir)?;
    let designed = project
        .load_design(design, model)
        .with_context(|| format!("Failed to apply design {}", design))?;
    designed
        .write_json(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Wrote design {} to {}", design, output.display());
    Ok(())
}

//! DCAT-AP.de to CKAN CLI
//!
//! Command-line tool for uploading DCAT datasets into a CKAN portal.

use std::cell::Cell;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use dcat_ckan_upload::config::DEFAULT_TIMEOUT_SECS;
use dcat_ckan_upload::rest::RestClient;
use dcat_ckan_upload::{
    collection_of, load_graph, organization_of, CatalogClient, CkanApi, Config, DcatUploader,
    DocumentSource, Package, RdfGraph, Resource, UploadError,
};

#[derive(Parser)]
#[command(name = "dcat-ckan-upload")]
#[command(about = "Upload DCAT-AP.de metadata into a CKAN portal")]
#[command(version)]
struct Cli {
    /// CKAN instance to talk to
    #[arg(long, global = true, env = "CKAN_URL", default_value = dcat_ckan_upload::vocab::PORTAL_BASE_URL)]
    ckan_url: String,

    /// API key, sent as the Authorization header
    #[arg(long, global = true, env = "CKAN_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, global = true, env = "CKAN_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            ckan_url: self.ckan_url.clone(),
            api_key: self.api_key.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Upload datasets from an RDF document (JSON-LD, Turtle, RDF/XML)
    Upload(UploadArgs),
    /// Print the newest dataset of a collection
    Newest(NewestArgs),
    /// Print organization, collection and newest resource of a package
    Show(ShowArgs),
}

#[derive(Args)]
struct UploadArgs {
    /// Path or URL of the metadata document
    source: String,

    /// Only upload these dataset IRIs (default: every dcat:Dataset)
    #[arg(long = "dataset", value_name = "IRI")]
    datasets: Vec<String>,

    /// Print the payloads instead of sending them
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct NewestArgs {
    /// Collection name
    collection: String,
}

#[derive(Args)]
struct ShowArgs {
    /// Package id or name
    id: String,
}

/// Catalog that prints payloads to stdout instead of calling CKAN
#[derive(Default)]
struct DryRunCatalog {
    resources: Cell<usize>,
}

impl CatalogClient for DryRunCatalog {
    fn create_package(&self, package: &Package) -> Result<String, UploadError> {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({"package_create": package}))?
        );
        Ok(package.name.clone())
    }

    fn create_resource(&self, resource: &Resource) -> Result<String, UploadError> {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({"resource_create": resource}))?
        );
        self.resources.set(self.resources.get() + 1);
        Ok(format!("dry-run-resource-{}", self.resources.get()))
    }

    fn put_dataset_in_collection(
        &self,
        package_id: &str,
        collection: &str,
    ) -> Result<(), UploadError> {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "put_dataset_in_collection": {"package_id": package_id, "collection": collection}
            }))?
        );
        Ok(())
    }
}

fn select_datasets(graph: &RdfGraph, requested: &[String]) -> Result<Vec<String>, UploadError> {
    if requested.is_empty() {
        let datasets = graph.datasets();
        if datasets.is_empty() {
            return Err(UploadError::InvalidGraph(
                "document contains no dcat:Dataset".to_string(),
            ));
        }
        return Ok(datasets);
    }

    requested
        .iter()
        .map(|iri| {
            if graph.contains(iri) {
                Ok(iri.clone())
            } else {
                Err(UploadError::InvalidGraph(format!(
                    "dataset '{}' not found in document",
                    iri
                )))
            }
        })
        .collect()
}

fn upload_all<C: CatalogClient>(
    uploader: &DcatUploader<C>,
    graph: &RdfGraph,
    datasets: &[String],
    print_ids: bool,
) -> Result<(), UploadError> {
    for dataset in datasets {
        let package_id = uploader.upload(graph, dataset)?;
        if print_ids {
            println!("{}\t{}", dataset, package_id);
        }
    }
    eprintln!("Uploaded {} datasets", datasets.len());
    Ok(())
}

fn run_upload(args: UploadArgs, config: &Config) -> Result<(), UploadError> {
    let graph = load_graph(&DocumentSource::parse(&args.source), config.timeout)?;
    let datasets = select_datasets(&graph, &args.datasets)?;

    if args.dry_run {
        let uploader = DcatUploader::new(DryRunCatalog::default());
        upload_all(&uploader, &graph, &datasets, false)
    } else {
        let uploader = DcatUploader::new(CkanApi::from_config(config)?);
        upload_all(&uploader, &graph, &datasets, true)
    }
}

fn run_newest(args: NewestArgs, config: &Config) -> Result<(), UploadError> {
    let api = CkanApi::from_config(config)?;
    match api.find_newest_dataset(&args.collection)? {
        Some(name) => println!("{}", name),
        None => eprintln!("Collection '{}' has no current dataset", args.collection),
    }
    Ok(())
}

/// Package overview built from a single `package_show` call
fn package_summary<R: RestClient>(api: &CkanApi<R>, id: &str) -> Result<Value, UploadError> {
    let dataset = api
        .read_dataset(id)?
        .ok_or_else(|| UploadError::NotFound(id.to_string()))?;
    let resource = api.get_resource(&dataset, true);

    Ok(json!({
        "id": dataset.get("id"),
        "name": dataset.get("name"),
        "organization": organization_of(&dataset),
        "collection": collection_of(&dataset),
        "newest_resource": resource.map(|r| json!({
            "id": r.id,
            "name": r.name,
            "url": r.access_url,
            "format": r.format,
            "mimetype": r.mime_type,
            "size": r.byte_size,
            "hash": r.checksum,
        })),
    }))
}

fn run_show(args: ShowArgs, config: &Config) -> Result<(), UploadError> {
    let api = CkanApi::from_config(config)?;
    let summary = package_summary(&api, &args.id)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();

    let result = match cli.command {
        Commands::Upload(args) => run_upload(args, &config),
        Commands::Newest(args) => run_newest(args, &config),
        Commands::Show(args) => run_show(args, &config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

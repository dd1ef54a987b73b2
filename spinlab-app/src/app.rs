use std::{io::Write, path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use itertools::Itertools;
use rand::{SeedableRng, rngs::StdRng};
use spinlab_core::meta::{RELEASE, VERSION};
use strum::IntoEnumIterator;

use crate::{
    command::PanelCommand,
    config::SpinlabConfig,
    db::LayoutDb,
    network::SpinNetwork,
    panel::{
        data::PanelData,
        kind::PanelId,
        list::{PanelListSizes, visible_panels},
        position::Region,
        registry::PanelRegistry,
        view::{LayoutFrame, RegionFrame},
    },
};

mod logging;

#[derive(Parser, Debug)]
#[command(name = "spinlab", version = VERSION)]
#[command(about = "Inspect and drive the spinlab workbench panel layout")]
pub struct Cli {
    /// Folder holding the persisted layout, instead of the per-user data
    /// directory.
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Settings file layered over the defaults and the user settings.
    #[arg(long, global = true, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Print the current layout frame.
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Toggle a panel between minimized and shown.
    Minimize { id: String },
    /// Toggle a panel between maximized and restored.
    Maximize { id: String },
    /// Hide a panel and drop its maximized flag.
    Close { id: String },
    /// Show a closed panel again.
    Reopen { id: String },
    /// Set a panel's visibility.
    SetVisible {
        id: String,
        #[arg(action = ArgAction::Set)]
        visible: bool,
    },
    /// Resize a region, clamped to its limits.
    Resize {
        region: Region,
        #[arg(allow_negative_numbers = true)]
        size: f64,
    },
    /// Forget every change and go back to the default layout.
    Reset,
    /// Print the sizes of the panels stacked in each region.
    Lists,
    /// Store the sizes of the panels stacked in a region.
    ListLayout {
        region: Region,
        #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
        sizes: Vec<f64>,
    },
    /// Print the spin network shown in the viewport.
    Network {
        /// Square network with random spins instead of the fixed one.
        #[arg(long)]
        random: bool,
        /// Seed for the random spins; implies --random.
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        json: bool,
    },
}

pub fn launch() -> ExitCode {
    let cli = Cli::parse();

    let _guard = logging::logging();
    logging::panic_hook();
    let release: &str = RELEASE.as_ref();
    tracing::info!("spinlab {VERSION} ({release} build)");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match run(cli, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let config = SpinlabConfig::load(cli.settings.as_deref())?;
    let registry = Arc::new(config.registry()?);
    let db = LayoutDb::open(cli.data_dir)?;
    Workbench::new(registry, db).execute(&cli.command, out)
}

/// The panel store wired to its persistence, as the workbench window owns it.
pub struct Workbench {
    data: PanelData,
    db: LayoutDb,
}

impl Workbench {
    pub fn new(registry: Arc<PanelRegistry>, db: LayoutDb) -> Self {
        let state = db.load(&registry);
        let mut data = PanelData::new(registry, state);
        data.observe(db.clone());
        Self { data, db }
    }

    pub fn data(&self) -> &PanelData {
        &self.data
    }

    pub fn execute(&mut self, command: &CliCommand, out: &mut impl Write) -> Result<()> {
        match command {
            CliCommand::Show { json } => self.show(*json, out),
            CliCommand::Minimize { id } => self.apply(
                PanelCommand::Minimize {
                    id: PanelId::from(id.as_str()),
                },
                out,
            ),
            CliCommand::Maximize { id } => self.apply(
                PanelCommand::Maximize {
                    id: PanelId::from(id.as_str()),
                },
                out,
            ),
            CliCommand::Close { id } => self.apply(
                PanelCommand::Close {
                    id: PanelId::from(id.as_str()),
                },
                out,
            ),
            CliCommand::Reopen { id } => self.apply(
                PanelCommand::Reopen {
                    id: PanelId::from(id.as_str()),
                },
                out,
            ),
            CliCommand::SetVisible { id, visible } => self.apply(
                PanelCommand::SetVisible {
                    id: PanelId::from(id.as_str()),
                    visible: *visible,
                },
                out,
            ),
            CliCommand::Resize { region, size } => self.apply(
                PanelCommand::Resize {
                    region: *region,
                    size: *size,
                },
                out,
            ),
            CliCommand::Reset => {
                let regions: Vec<Region> = Region::iter().collect();
                if !self.transition(&regions, |data| data.reset()) {
                    tracing::info!("layout already at its defaults");
                }
                self.show(false, out)
            }
            CliCommand::Lists => self.lists(out),
            CliCommand::ListLayout { region, sizes } => {
                let mut list = PanelListSizes::for_region(
                    &self.db,
                    self.data.registry(),
                    self.data.state(),
                    *region,
                );
                let expected = list.sizes().len();
                if !list.set_layout(&self.db, sizes.clone()) {
                    bail!(
                        "{region} rejected sizes {}: expected {expected} sizes, each \
                         between its panel's minimum and 100",
                        sizes.iter().join(", ")
                    );
                }
                self.lists(out)
            }
            CliCommand::Network { random, seed, json } => {
                let network = if *random || seed.is_some() {
                    let mut rng = match seed {
                        Some(seed) => StdRng::seed_from_u64(*seed),
                        None => StdRng::from_rng(&mut rand::rng()),
                    };
                    SpinNetwork::random_square(&mut rng)
                } else {
                    SpinNetwork::fixed()
                };
                print_network(&network, *json, out)
            }
        }
    }

    fn apply(&mut self, command: PanelCommand, out: &mut impl Write) -> Result<()> {
        let regions = match command.panel() {
            Some(id) => vec![self.data.descriptor(id.as_str())?.region],
            None => Vec::new(),
        };
        if !self.transition(&regions, |data| data.run(&command)) {
            tracing::info!("{} left the layout unchanged", command.str());
        }
        self.show(false, out)
    }

    /// Runs `f` and resets the panel lists of `regions` whose panel count it
    /// changed.
    fn transition(
        &mut self,
        regions: &[Region],
        f: impl FnOnce(&mut PanelData) -> bool,
    ) -> bool {
        let mut lists: Vec<(Region, PanelListSizes)> = regions
            .iter()
            .map(|region| {
                let list = PanelListSizes::for_region(
                    &self.db,
                    self.data.registry(),
                    self.data.state(),
                    *region,
                );
                (*region, list)
            })
            .collect();

        let changed = f(&mut self.data);

        for (region, list) in lists.iter_mut() {
            let panels = visible_panels(self.data.registry(), self.data.state(), *region);
            if list.sync(&self.db, &panels) {
                tracing::debug!("reset {} to {:?}", list.storage_key(), list.sizes());
            }
        }
        changed
    }

    fn show(&self, json: bool, out: &mut impl Write) -> Result<()> {
        let frame = LayoutFrame::compute(self.data.registry(), self.data.state());
        if json {
            writeln!(out, "{}", serde_json::to_string_pretty(&frame)?)?;
            return Ok(());
        }

        for region in frame.regions() {
            writeln!(out, "{}", format_region(region))?;
        }
        writeln!(
            out,
            "center {:>5.1}%  main {:>5.1}%{}",
            frame.center,
            frame.main,
            if frame.cramped { "  (cramped)" } else { "" }
        )?;
        Ok(())
    }

    fn lists(&self, out: &mut impl Write) -> Result<()> {
        for region in Region::iter() {
            let list = PanelListSizes::for_region(
                &self.db,
                self.data.registry(),
                self.data.state(),
                region,
            );
            writeln!(
                out,
                "{}: [{}]",
                list.storage_key(),
                list.sizes().iter().join(", ")
            )?;
        }
        Ok(())
    }
}

fn format_region(frame: &RegionFrame) -> String {
    let panels = frame
        .panels
        .iter()
        .map(|p| {
            if p.maximized {
                format!("{}*", p.id)
            } else {
                p.id.to_string()
            }
        })
        .join(", ");
    format!("{:<6} {:>5.1}%  [{panels}]", frame.region.as_ref(), frame.share)
}

fn print_network(network: &SpinNetwork, json: bool, out: &mut impl Write) -> Result<()> {
    if json {
        #[derive(serde::Serialize)]
        struct NetworkOutput<'a> {
            #[serde(flatten)]
            network: &'a SpinNetwork,
            segments: Vec<crate::network::EdgeSegment>,
            info: crate::network::SceneInfo,
        }
        let output = NetworkOutput {
            network,
            segments: network.segments(),
            info: network.scene_info(),
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
        return Ok(());
    }

    let info = network.scene_info();
    writeln!(out, "nodes: {}  edges: {}", info.nodes, info.edges)?;
    for node in &network.nodes {
        writeln!(out, "{} ({})", node.id, node.position.iter().join(", "))?;
    }
    for segment in network.segments() {
        writeln!(
            out,
            "{}-{} j={} at ({})",
            segment.source,
            segment.target,
            segment.label,
            segment.mid.iter().join(", ")
        )?;
    }
    Ok(())
}

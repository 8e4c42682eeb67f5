use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use alphatree::filter::{
    Colorizer, DepthShade, FilterEngine, FilterMode, MeanColor, RegionPalette,
};
use alphatree::metric::{Dissimilarity, MetricKind, Normalized, OrthogonalStrength};
use alphatree::{AlphaTree, EdgeWeight, PixelGrid, TreeConfig};

#[derive(Parser, Debug)]
#[command(name = "alphatree", about = "Alpha-tree segmentation of raw interleaved images")]
struct Cli {
    /// Log every construction phase.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the tree and print its shape.
    Stats {
        /// Raw 8-bit interleaved pixel buffer.
        input: PathBuf,
        #[command(flatten)]
        tree: TreeArgs,
    },
    /// Collapse the tree at one threshold and write the result.
    Filter {
        /// Raw 8-bit interleaved pixel buffer.
        input: PathBuf,
        /// Destination for the filtered buffer (same layout as the input).
        output: PathBuf,
        #[command(flatten)]
        tree: TreeArgs,
        /// Region criterion.
        #[arg(long, value_enum, default_value_t = ModeArg::Area)]
        mode: ModeArg,
        /// Threshold.
        #[arg(long)]
        lambda: f64,
        /// How regions are coloured.
        #[arg(long, value_enum, default_value_t = ColorArg::Mean)]
        colorize: ColorArg,
        /// Seed for the palette colouring.
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Count regions for a series of thresholds, reusing one engine.
    Sweep {
        /// Raw 8-bit interleaved pixel buffer.
        input: PathBuf,
        #[command(flatten)]
        tree: TreeArgs,
        /// Region criterion.
        #[arg(long, value_enum, default_value_t = ModeArg::Area)]
        mode: ModeArg,
        /// Thresholds, in query order (repeat the flag).
        #[arg(long = "lambda", required = true)]
        lambdas: Vec<f64>,
    },
}

#[derive(Args, Debug)]
struct TreeArgs {
    /// Image width in pixels.
    #[arg(long)]
    width: usize,
    /// Image height in pixels.
    #[arg(long)]
    height: usize,
    /// Bytes per pixel.
    #[arg(long, default_value_t = 3)]
    channels: usize,
    /// Neighbourhood size (4 or 8).
    #[arg(long, default_value_t = 4)]
    connectivity: u8,
    /// Pixel dissimilarity.
    #[arg(long, value_enum, default_value_t = MetricArg::Euclidean)]
    metric: MetricArg,
    /// Per-channel weights for the weighted metric.
    #[arg(long, value_delimiter = ',')]
    weights: Option<Vec<f64>>,
    /// Order of the Minkowski metric.
    #[arg(long)]
    p: Option<f64>,
    /// Merge edges up to this alpha before queueing.
    #[arg(long)]
    lambda_min: Option<f64>,
    /// Drop edges above lambda-min, building a forest.
    #[arg(long)]
    exclude_top: bool,
    /// Rescale the metric onto [LO, HI].
    #[arg(long, num_args = 2, value_names = ["LO", "HI"])]
    normalize: Option<Vec<f64>>,
    /// Add the gradient across each edge to its weight.
    #[arg(long)]
    orthogonal: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum MetricArg {
    Euclidean,
    Weighted,
    Manhattan,
    Cosine,
    Minkowski,
    Chebyshev,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Area,
    Salience,
    Alpha,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ColorArg {
    Mean,
    Palette,
    Depth,
}

impl From<ModeArg> for FilterMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Area => FilterMode::Area,
            ModeArg::Salience => FilterMode::Salience,
            ModeArg::Alpha => FilterMode::Alpha,
        }
    }
}

impl TreeArgs {
    fn config(&self) -> Result<TreeConfig> {
        let mut config = TreeConfig::new(self.connectivity)?;
        if let Some(lambda_min) = self.lambda_min {
            config = config.with_lambda_min(lambda_min)?;
        }
        if self.exclude_top {
            config = config.with_exclude_top(true);
        }
        Ok(config)
    }

    fn edge_weight(&self) -> Result<Box<dyn EdgeWeight>> {
        let kind = match self.metric {
            MetricArg::Euclidean => MetricKind::Euclidean,
            MetricArg::Manhattan => MetricKind::Manhattan,
            MetricArg::Cosine => MetricKind::Cosine,
            MetricArg::Chebyshev => MetricKind::Minkowski(f64::INFINITY),
            MetricArg::Minkowski => MetricKind::Minkowski(self.p.unwrap_or(2.0)),
            MetricArg::Weighted => MetricKind::Weighted(
                self.weights
                    .clone()
                    .context("--metric weighted requires --weights")?,
            ),
        };
        let mut metric: Box<dyn Dissimilarity> = kind.into_metric()?;
        if let Some(range) = &self.normalize {
            let [lower, upper] = range[..] else {
                bail!("--normalize takes exactly two values");
            };
            metric = Box::new(Normalized::new(metric, lower, upper)?);
        }
        Ok(if self.orthogonal {
            Box::new(OrthogonalStrength::unit(metric))
        } else {
            Box::new(metric)
        })
    }

    fn build(&self, input: &Path) -> Result<AlphaTree> {
        let data = std::fs::read(input)
            .with_context(|| format!("failed to read pixels from {}", input.display()))?;
        let grid = PixelGrid::new(self.width, self.height, self.channels, &data)
            .with_context(|| format!("{} does not match the given dimensions", input.display()))?;
        let config = self.config()?;
        let weight = self.edge_weight()?;
        AlphaTree::build(&grid, weight.as_ref(), &config).context("tree construction failed")
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Stats { input, tree } => run_stats(&input, &tree)?,
        Commands::Filter {
            input,
            output,
            tree,
            mode,
            lambda,
            colorize,
            seed,
        } => run_filter(&input, &output, &tree, mode.into(), lambda, colorize, seed)?,
        Commands::Sweep {
            input,
            tree,
            mode,
            lambdas,
        } => run_sweep(&input, &tree, mode.into(), &lambdas)?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_stats(input: &Path, args: &TreeArgs) -> Result<()> {
    let tree = args.build(input)?;
    let summary = tree.summary();

    println!("leaves\t{}", summary.leaves);
    println!("nodes\t{}", summary.nodes);
    println!("internal\t{}", summary.internal);
    println!("roots\t{}", summary.roots);
    match summary.root_alpha {
        Some(alpha) => println!("root_alpha\t{alpha:.4}"),
        None => println!("root_alpha\t-"),
    }
    println!("max_depth\t{}", summary.max_depth);
    Ok(())
}

fn run_filter(
    input: &Path,
    output: &Path,
    args: &TreeArgs,
    mode: FilterMode,
    lambda: f64,
    colorize: ColorArg,
    seed: u64,
) -> Result<()> {
    let tree = args.build(input)?;
    let colorizer: Box<dyn Colorizer> = match colorize {
        ColorArg::Mean => Box::new(MeanColor),
        ColorArg::Palette => Box::new(RegionPalette::new(seed)),
        ColorArg::Depth => Box::new(DepthShade::new(&tree)),
    };

    let mut engine = FilterEngine::new(&tree, mode, colorizer);
    let pixels = engine
        .filter(lambda)
        .with_context(|| format!("filtering at lambda {lambda} failed"))?;
    std::fs::write(output, &pixels)
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(bytes = pixels.len(), output = %output.display(), "wrote filtered image");
    Ok(())
}

fn run_sweep(input: &Path, args: &TreeArgs, mode: FilterMode, lambdas: &[f64]) -> Result<()> {
    let tree = args.build(input)?;
    let mut engine = FilterEngine::new(&tree, mode, MeanColor);

    for &lambda in lambdas {
        let regions = engine
            .region_count(lambda)
            .with_context(|| format!("region count at lambda {lambda} failed"))?;
        println!("{lambda}\t{regions}");
    }
    Ok(())
}

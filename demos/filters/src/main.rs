use argh::FromArgs;
use std::path::PathBuf;

use convokit::{
    image::Image,
    imgproc::{
        self,
        filter::{BorderPolicy, FilterConfig, FilterKind, GaussianParams},
        parallel::ExecutionStrategy,
    },
};

#[derive(FromArgs)]
/// Apply a convolution filter to the synthetic test scene
struct Args {
    /// the filter to apply: gaussian, sharpen, sobel or custom
    #[argh(option, default = "String::from(\"gaussian\")")]
    filter: String,

    /// the gaussian kernel size
    #[argh(option)]
    size: Option<usize>,

    /// the gaussian sigma
    #[argh(option)]
    sigma: Option<f64>,

    /// the border policy for kernel filters: clamp or reflect
    #[argh(option, default = "String::from(\"clamp\")")]
    border: String,

    /// nine comma separated coefficients for sharpen, sobel or custom
    #[argh(option)]
    kernel: Option<String>,

    /// a json filter config, overrides the other filter options
    #[argh(option)]
    config: Option<PathBuf>,

    /// run rows sequentially on the current thread
    #[argh(switch)]
    serial: bool,

    /// the width of the test scene
    #[argh(option, default = "400")]
    width: usize,

    /// the height of the test scene
    #[argh(option, default = "400")]
    height: usize,
}

fn parse_coefficients(text: &str) -> Result<[f64; 9], Box<dyn std::error::Error>> {
    let values = text
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()?;

    let coefficients: [f64; 9] = values
        .try_into()
        .map_err(|v: Vec<f64>| format!("expected 9 coefficients, got {}", v.len()))?;

    if let Some(c) = coefficients
        .iter()
        .find(|c| c.abs() > imgproc::filter::COEFFICIENT_BOUND)
    {
        return Err(format!("coefficient {c} is out of range").into());
    }
    Ok(coefficients)
}

fn config_from_args(args: &Args) -> Result<FilterConfig, Box<dyn std::error::Error>> {
    if let Some(path) = &args.config {
        let text = std::fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&text)?);
    }

    let kind = match args.filter.to_lowercase().as_str() {
        "gaussian" => FilterKind::GaussianBlur,
        "sharpen" => FilterKind::Sharpen,
        "sobel" => FilterKind::SobelX,
        "custom" => FilterKind::Custom,
        _ => return Err(format!("Invalid filter: {}", args.filter).into()),
    };

    let border = match args.border.to_lowercase().as_str() {
        "clamp" => BorderPolicy::Clamp,
        "reflect" => BorderPolicy::Reflect,
        _ => return Err(format!("Invalid border: {}", args.border).into()),
    };

    let defaults = GaussianParams::default();
    let gaussian = GaussianParams {
        size: args.size.unwrap_or(defaults.size),
        sigma: args.sigma.unwrap_or(defaults.sigma),
    };
    if !gaussian.is_in_user_range() {
        log::warn!(
            "gaussian parameters {:?} are outside the usual range",
            gaussian
        );
    }

    let strategy = if args.serial {
        ExecutionStrategy::Serial
    } else {
        ExecutionStrategy::Auto
    };

    Ok(FilterConfig {
        kind,
        gaussian,
        coefficients: args.kernel.as_deref().map(parse_coefficients).transpose()?,
        border,
        strategy,
    })
}

fn channel_means<const C: usize>(img: &Image<u8, C>) -> [f64; C] {
    let mut sums = [0u64; C];
    for pixel in img.as_slice().chunks_exact(C) {
        sums.iter_mut().zip(pixel).for_each(|(s, &v)| *s += v as u64);
    }
    let n = img.size().num_pixels().max(1) as f64;
    sums.map(|s| s as f64 / n)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let config = config_from_args(&args)?;
    log::info!("filter config: {:?}", config);

    let img = imgproc::draw::synthetic_test_image([args.width, args.height].into())?;

    let start = std::time::Instant::now();
    let filtered = config.apply(&img)?;
    let elapsed = start.elapsed();

    println!("image size: {}", img.size());
    println!("input channel means:    {:.2?}", channel_means(&img));
    println!("filtered channel means: {:.2?}", channel_means(&filtered));
    println!("elapsed: {:?}", elapsed);

    Ok(())
}

use anyhow::{anyhow, Context};
use clap::{App, Arg};
use log::info;

use grid2healpix::pixelization::RingHealpix;
use grid2healpix::fits::{dump_grid, dump_healpix_map, load_grid};
use grid2healpix::Resampler;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = App::new("grid2healpix")
        .about("resample a (b, l) grid onto a RING ordered healpix map")
        .arg(
            Arg::with_name("grid")
                .short("g")
                .long("grid")
                .required(true)
                .takes_value(true)
                .value_name("grid file")
                .help("FITS image, one row per b, values per pixel"),
        )
        .arg(
            Arg::with_name("anchor")
                .short("a")
                .long("anchor")
                .required(true)
                .takes_value(true)
                .allow_hyphen_values(true)
                .number_of_values(2)
                .value_delimiter(",")
                .value_names(&["b", "l"])
                .help("b and l of the [0,0] grid element in degree"),
        )
        .arg(
            Arg::with_name("spacing")
                .short("s")
                .long("spacing")
                .required(true)
                .takes_value(true)
                .value_name("spacing")
                .help("grid spacing in degree"),
        )
        .arg(
            Arg::with_name("nside")
                .short("n")
                .long("nside")
                .required(true)
                .takes_value(true)
                .value_name("nside")
                .help("nside of the output map"),
        )
        .arg(
            Arg::with_name("out")
                .short("o")
                .long("out")
                .required(true)
                .takes_value(true)
                .value_name("out file name")
                .help("output healpix map (FITS, RING ordering)"),
        )
        .arg(
            Arg::with_name("density")
                .short("d")
                .long("density")
                .takes_value(true)
                .value_name("density file name")
                .help("also write the full-sky density grid (per sr) as a FITS image"),
        )
        .arg(
            Arg::with_name("parallel")
                .short("p")
                .long("parallel")
                .help("evaluate pixels on all cores"),
        )
        .get_matches();

    let parse = |name: &str, s: &str| -> anyhow::Result<f64> {
        s.parse::<f64>()
            .with_context(|| format!("invalid {}: {:?}", name, s))
    };

    let anchor: Vec<&str> = matches
        .values_of("anchor")
        .ok_or_else(|| anyhow!("missing anchor"))?
        .collect();
    let anchor_bl = (parse("b", anchor[0])?, parse("l", anchor[1])?);
    let spacing = parse("spacing", matches.value_of("spacing").unwrap_or_default())?;
    let nside = matches
        .value_of("nside")
        .unwrap_or_default()
        .parse::<usize>()
        .context("invalid nside")?;
    let grid_name = matches.value_of("grid").unwrap_or_default();
    let out_name = matches.value_of("out").unwrap_or_default();

    let cmap = load_grid(grid_name).with_context(|| format!("reading {}", grid_name))?;
    info!(
        "{} x {} grid anchored at b={} l={}, spacing {} deg",
        cmap.nrows(),
        cmap.ncols(),
        anchor_bl.0,
        anchor_bl.1,
        spacing
    );

    let hp = RingHealpix::new(nside)?;
    let resampler = Resampler::new(cmap.view(), anchor_bl, spacing)?;
    let hmap = if matches.is_present("parallel") {
        resampler.to_healpix_par(&hp)
    } else {
        resampler.to_healpix(&hp)
    };

    if let Some(name) = matches.value_of("density") {
        dump_grid(resampler.sky_grid().density(), name)
            .with_context(|| format!("writing {}", name))?;
    }

    info!(
        "nside {}: {} pixels, total {:e} (input total {:e})",
        hp.nside(),
        hmap.len(),
        hmap.iter().sum::<f64>(),
        cmap.sum()
    );
    dump_healpix_map(&hmap, out_name).with_context(|| format!("writing {}", out_name))?;
    Ok(())
}

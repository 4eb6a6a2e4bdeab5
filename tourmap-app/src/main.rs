use std::path::PathBuf;

use anyhow::{bail, Context};
use tourmap::prelude::*;

/// Runs a map page headlessly and prints what it would show
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse(std::env::args().skip(1))?;
    if args.help {
        print_usage();
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => MapViewConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MapViewConfig::default(),
    };
    config.validate()?;

    let store = FileCredentialStore::new(
        config
            .credential_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("tourmap-storage.json")),
    );
    let mut view = MapView::new(config.clone(), HeadlessFactory::with_preloaded_style(), store);

    if let Some(path) = &args.data {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        view.set_sources(&SourceCollections::from_json_str(&json)?)?;
    }

    let mut status = view.mount(ContainerId::new("map"))?;
    if let Some(token) = &args.token {
        status = view.set_credential(token)?;
    }
    if status == ViewStatus::NeedsCredential {
        println!("Informe seu token do Mapbox (--token) para exibir o mapa.");
    }

    if args.geocode {
        let geocoder = Geocoder::from_config(&config.geocoder)?;
        let moved = view.geocode_points(&geocoder).await?;
        log::info!("{} points repositioned by remote geocoding", moved);
    }

    let mut filter = FilterState::default().with_categories(args.categories.iter().cloned());
    if let Some(query) = &args.search {
        filter = filter.with_search(query.clone());
    }
    if let Some(rating) = args.rating {
        filter = filter.with_rating(rating);
    }
    if let Some(price) = args.price {
        filter = filter.with_price(price);
    }
    view.set_filter(filter)?;

    if let Some(kind) = args.strategy {
        view.set_strategy(kind)?;
    }
    view.pump_events()?;

    if let Some(at) = args.at {
        let mut location = UserLocation::new(FixedPosition(Ok(at)));
        if let Some(found) = view.locate_user(&mut location).await {
            println!("Você está em {found}");
        }
    }

    println!(
        "{} de {} pontos visíveis ({})",
        view.visible_points().len(),
        view.points().len(),
        view.strategy_kind()
    );
    for point in view.visible_points() {
        println!(
            "  {:<28} {:<12} {}",
            point.id,
            point.category.label(),
            point.coordinates
        );
    }

    if let Some(map) = view.map() {
        println!("câmera: {} zoom {:.1}", map.center(), map.zoom());
    }

    view.unmount();
    Ok(())
}

#[derive(Debug, Default)]
struct Args {
    help: bool,
    data: Option<PathBuf>,
    config: Option<PathBuf>,
    token: Option<String>,
    categories: Vec<String>,
    search: Option<String>,
    rating: Option<f64>,
    price: Option<RawPriceRange>,
    strategy: Option<StrategyKind>,
    geocode: bool,
    at: Option<LngLat>,
}

impl Args {
    fn parse(mut raw: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut args = Args::default();
        while let Some(flag) = raw.next() {
            let mut value = || raw.next().with_context(|| format!("{flag} needs a value"));
            match flag.as_str() {
                "-h" | "--help" => args.help = true,
                "--data" => args.data = Some(value()?.into()),
                "--config" => args.config = Some(value()?.into()),
                "--token" => args.token = Some(value()?),
                "--category" => args.categories.push(value()?),
                "--search" => args.search = Some(value()?),
                "--rating" => args.rating = Some(value()?.parse().context("--rating")?),
                "--price" => args.price = Some(parse_price(&value()?)?),
                "--cluster" => args.strategy = Some(StrategyKind::Clustering),
                "--markers" => args.strategy = Some(StrategyKind::Markers),
                "--geocode" => args.geocode = true,
                "--at" => args.at = Some(parse_lng_lat(&value()?)?),
                other => bail!("unknown argument {other}"),
            }
        }
        Ok(args)
    }
}

fn parse_price(text: &str) -> anyhow::Result<RawPriceRange> {
    if let Some((min, max)) = text.split_once("..") {
        return Ok(RawPriceRange::Range([
            min.trim().parse().context("price min")?,
            max.trim().parse().context("price max")?,
        ]));
    }
    let bucket = match text {
        "all" => PriceBucket::All,
        "low" => PriceBucket::Low,
        "medium" => PriceBucket::Medium,
        "high" => PriceBucket::High,
        other => bail!("unknown price bucket {other}"),
    };
    Ok(RawPriceRange::Bucket(bucket))
}

fn parse_lng_lat(text: &str) -> anyhow::Result<LngLat> {
    let Some((lng, lat)) = text.split_once(',') else {
        bail!("expected lng,lat");
    };
    Ok(LngLat::new(
        lng.trim().parse().context("longitude")?,
        lat.trim().parse().context("latitude")?,
    ))
}

fn print_usage() {
    println!(
        "tourmap-app [--data sources.json] [--config config.json] [--token TOKEN]\n\
         \x20           [--category LABEL]... [--search TEXT] [--rating MIN]\n\
         \x20           [--price low|medium|high|MIN..MAX] [--cluster | --markers]\n\
         \x20           [--geocode] [--at LNG,LAT]"
    );
}

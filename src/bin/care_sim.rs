//! Headless Care Simulation
//!
//! Builds a synthetic city in memory, registers care facilities and runs the
//! matching and admission loop for a number of frames.

use std::path::PathBuf;

use care_homes::core::config::CareConfig;
use care_homes::core::error::Result;
use care_homes::core::types::{Vec3, Wealth};
use care_homes::facility::{FacilityKind, FacilitySettings};
use care_homes::population::{BehaviorType, CityArena};
use care_homes::simulation::{CareSimulation, SimulationStats};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Headless care simulation - nursing homes and orphanages in a synthetic city
#[derive(Parser, Debug)]
#[command(name = "care_sim")]
#[command(about = "Run the care facility matching loop over a synthetic city")]
struct Args {
    /// Residential buildings to generate
    #[arg(long, default_value_t = 2000)]
    buildings: u32,

    /// Care facilities to place (alternating senior and child care)
    #[arg(long, default_value_t = 8)]
    facilities: u32,

    /// Frames to simulate
    #[arg(long, default_value_t = 4096)]
    frames: u32,

    /// Random seed for city generation
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,
}

#[derive(Serialize)]
struct FacilityReport {
    building: u16,
    kind: FacilityKind,
    residents: u32,
    rooms_occupied: u32,
    rooms_total: u32,
}

#[derive(Serialize)]
struct RunSummary {
    seed: u64,
    frames: u32,
    persons: usize,
    stats: SimulationStats,
    facilities: Vec<FacilityReport>,
}

/// City extent in world units
const CITY_SIZE: f32 = 2000.0;

fn generate_city(args: &Args, config: &CareConfig) -> CityArena {
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut city = CityArena::new(config.scan.address_space());

    for _ in 0..args.buildings {
        let position = Vec3::new(rng.gen_range(0.0..CITY_SIZE), 0.0, rng.gen_range(0.0..CITY_SIZE));
        let rooms = rng.gen_range(1..=4);
        let building = city.spawn_building(BehaviorType::Residential, position, rooms);
        if building.is_none() {
            tracing::warn!("Address space full after {} buildings", city.address_space() - 1);
            break;
        }

        for _ in 0..rooms {
            let members = rng.gen_range(1..=4);
            for _ in 0..members {
                let age = rng.gen_range(0..=230u8);
                let wealth = Wealth::from_ordinal(rng.gen_range(0..3));
                let person = city.spawn_person(age, wealth);
                city.move_in(person, building);
            }
        }
    }
    city
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("care_homes=info")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => CareConfig::load(path)?,
        None => CareConfig::default(),
    };

    let mut city = generate_city(&args, &config);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed.wrapping_add(1));
    let mut sites = Vec::new();
    for i in 0..args.facilities {
        let kind = if i % 2 == 0 {
            FacilityKind::SeniorCare
        } else {
            FacilityKind::ChildCare
        };
        let position = Vec3::new(rng.gen_range(0.0..CITY_SIZE), 0.0, rng.gen_range(0.0..CITY_SIZE));
        let building = city.spawn_building(kind.behavior(), position, 0);
        if building.is_none() {
            break;
        }
        let settings = FacilitySettings {
            quality: rng.gen_range(1..=5),
            ..Default::default()
        };
        city.set_staffed_workers(building, settings.staffing_targets);
        sites.push((building, kind, settings));
    }
    let persons = city.person_count();

    let mut sim = CareSimulation::new(city, config)?;
    for (building, kind, settings) in sites {
        sim.add_facility(building, kind, settings)?;
    }

    tracing::info!(
        "Simulating {} frames over {} persons and {} facilities",
        args.frames,
        persons,
        sim.controllers().len()
    );
    for _ in 0..args.frames {
        sim.step();
        sim.store_mut().advance_frame();
    }

    let summary = RunSummary {
        seed: args.seed,
        frames: args.frames,
        persons,
        stats: sim.stats(),
        facilities: sim
            .occupancy_report()
            .into_iter()
            .map(|(building, kind, occupancy)| FacilityReport {
                building: building.0,
                kind,
                residents: occupancy.residents,
                rooms_occupied: occupancy.rooms_occupied,
                rooms_total: occupancy.rooms_total,
            })
            .collect(),
    };

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_text(&summary);
    }
    Ok(())
}

fn print_text(summary: &RunSummary) {
    println!("Care Simulation");
    println!("===============");
    println!("Seed: {}  Frames: {}  Persons: {}", summary.seed, summary.frames, summary.persons);
    println!();
    println!("Admitted:   {}", summary.stats.admitted);
    println!("Declined:   {}", summary.stats.declined);
    println!("No match:   {}", summary.stats.no_match);
    println!("Discharged: {}", summary.stats.discharged);
    println!("Slices scanned: {} ({} contended)", summary.stats.slices_scanned, summary.stats.scans_contended);
    println!();
    println!("--- Facilities ---");
    for facility in &summary.facilities {
        println!(
            "#{:<5} {:<12} {:>3}/{:<3} rooms occupied, {} residents",
            facility.building,
            facility.kind.to_string(),
            facility.rooms_occupied,
            facility.rooms_total,
            facility.residents
        );
    }
}

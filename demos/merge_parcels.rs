mod common;

use common::{rect, DemoStore};
use map_analysis::crs::{convert_geometry, CrsDescriptor, CrsRegistry};
use map_analysis::geometry::{Feature, FeatureId, LayerId};
use map_analysis::options::MergeOptions;
use map_analysis::{planar, MapAnalysis};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let registry = CrsRegistry::new();
    let mercator = CrsDescriptor::new("EPSG:3857");
    let mut store = DemoStore::default();

    // 250 small parcels, loaded in packages of 100
    let parcels: Vec<Feature> = (0..250)
        .map(|i| {
            let x = 30.0 + (i % 50) as f64 * 0.01;
            let y = 59.9 + (i / 50) as f64 * 0.01;
            Feature::new(i.to_string(), rect(x, y, x + 0.01, y + 0.01))
        })
        .collect();
    store.add_layer("parcels", CrsDescriptor::wgs84(), parcels);

    let lake = rect(30.1, 59.85, 30.2, 59.95);
    let lake = convert_geometry(&registry, &CrsDescriptor::wgs84(), &lake, &mercator)?;
    store.add_layer("water", mercator, vec![Feature::new("lake", lake.into_owned())]);

    let analysis = MapAnalysis::new(store);
    let ids: Vec<FeatureId> = (0..250).map(|i| FeatureId::new(i.to_string())).collect();
    let options = MergeOptions {
        is_union: true,
        ..MergeOptions::new()
    };

    let merged = analysis
        .merge_geometry(
            &LayerId::new("parcels"),
            &ids,
            &LayerId::new("water"),
            &[FeatureId::new("lake")],
            options,
        )
        .await?;

    match merged {
        Some(geometry) => println!(
            "{}: {} parts, {:.1} km^2",
            geometry.kind(),
            geometry.polygons().len(),
            planar::geodesic_area(&geometry) / 1e6
        ),
        None => println!("nothing to merge"),
    }
    Ok(())
}

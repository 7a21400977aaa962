mod common;

use common::{rect, DemoStore};
use map_analysis::crs::CrsDescriptor;
use map_analysis::geometry::{Feature, LayerId};
use map_analysis::MapAnalysis;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    // planned parcels against the surveyed ones, both in longitude/latitude
    let mut store = DemoStore::default();
    store.add_layer(
        "plan",
        CrsDescriptor::wgs84(),
        vec![
            Feature::new("p1", rect(37.60, 55.70, 37.62, 55.72)),
            Feature::new("p2", rect(37.63, 55.70, 37.64, 55.71)),
        ],
    );
    store.add_layer(
        "survey",
        CrsDescriptor::wgs84(),
        vec![
            Feature::new("s1", rect(37.61, 55.69, 37.65, 55.715)),
            Feature::new("s2", rect(37.59, 55.715, 37.61, 55.73)),
        ],
    );
    let analysis = MapAnalysis::new(store);
    let (plan, survey) = (LayerId::new("plan"), LayerId::new("survey"));

    for condition in ["contains", "intersects", "notIntersects"] {
        let records = match analysis.compare_layers(&plan, &survey, condition, false).await {
            Ok(records) => records,
            Err(e) => {
                eprintln!("{condition}: {e}");
                continue;
            }
        };
        println!("{condition}: {} difference polygons", records.len());
        for r in &records {
            println!(
                "  area {:.6} deg^2, matched {:?}",
                r.area_difference,
                r.matched_id.as_ref().map(|id| id.as_str())
            );
        }
    }

    match analysis.compare_layers(&plan, &survey, "overlaps", false).await {
        Ok(_) => unreachable!("unknown conditions are rejected"),
        Err(e) => println!("overlaps: {e}"),
    }
}

use crate::models::MapType;

pub fn list_maps() {
    for map_type in MapType::ALL.iter() {
        println!("{:<14}{}", map_type.as_str(), map_type.description());
    }
}

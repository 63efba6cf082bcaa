pub mod demand_map;
pub mod model;
pub mod predictions;
pub mod regions;

#[cfg(test)]
mod tests {
    #[test]
    fn test_module_structure() {
        assert_eq!(super::demand_map::GET_DEMAND_MAP, "get_demand_map");
        assert_eq!(super::predictions::GET_PREDICTIONS, "get_predictions");
        assert_eq!(super::regions::LIST_REGIONS, "list_regions");
        assert_eq!(super::model::GET_LATEST_MODEL, "get_latest_model");
    }
}

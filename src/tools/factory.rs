use super::{
    CalculatorTool, SummarizeTool, Tool, ToolRegistry, WeatherTool, WikipediaSummaryTool,
    WorldTimeTool,
};

/// Every built-in tool, one per plan step kind.
pub fn default_tools() -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(WeatherTool::new()),
        Box::new(WikipediaSummaryTool::new()),
        Box::new(CalculatorTool::new()),
        Box::new(WorldTimeTool::new()),
        Box::new(SummarizeTool::new()),
    ]
}

/// Registry pre-populated with the default tool set.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for tool in default_tools() {
        registry.register(tool);
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::ToolKind;
    use strum::IntoEnumIterator;

    #[test]
    fn every_step_kind_has_a_default_tool() {
        let registry = default_registry();
        for kind in ToolKind::iter() {
            assert!(registry.lookup(kind).is_ok(), "missing tool for {kind}");
        }
    }

    #[test]
    fn tool_names_are_unique() {
        let registry = default_registry();
        let names = registry.tool_names();
        assert_eq!(names.len(), 5);
        let mut deduped = names.clone();
        deduped.dedup();
        assert_eq!(names, deduped);
    }
}

//! The closed set of benchmark query categories.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryCategory {
    /// Queries that are part of a benchmark and not generated.
    Fixed,
    /// Table scans and selections.
    Select,
    /// Aggregations that do not aggregate any values.
    PseudoAggregate,
    Aggregate,
    SelectAggregate,
    Join,
    SelectJoin,
    JoinAgg,
    SelectJoinAgg,
    /// Joins with a group-by at the end but no groups.
    JoinSimpleAgg,
    SelectJoinSimpleAgg,
    ComplexSelect,
    ComplexSelectAgg,
    ComplexSelectJoin,
    ComplexSelectJoinAgg,
    ComplexSelectJoinSimpleAgg,
    Window,
}

impl QueryCategory {
    pub const ALL: [QueryCategory; 17] = [
        QueryCategory::Fixed,
        QueryCategory::Select,
        QueryCategory::PseudoAggregate,
        QueryCategory::Aggregate,
        QueryCategory::SelectAggregate,
        QueryCategory::Join,
        QueryCategory::SelectJoin,
        QueryCategory::JoinAgg,
        QueryCategory::SelectJoinAgg,
        QueryCategory::JoinSimpleAgg,
        QueryCategory::SelectJoinSimpleAgg,
        QueryCategory::ComplexSelect,
        QueryCategory::ComplexSelectAgg,
        QueryCategory::ComplexSelectJoin,
        QueryCategory::ComplexSelectJoinAgg,
        QueryCategory::ComplexSelectJoinSimpleAgg,
        QueryCategory::Window,
    ];

    /// Directory name benchmark files are stored under.
    pub fn dir_name(self) -> &'static str {
        match self {
            QueryCategory::Fixed => "fixed",
            QueryCategory::Select => "select",
            QueryCategory::PseudoAggregate => "pseudo_aggregate",
            QueryCategory::Aggregate => "aggregate",
            QueryCategory::SelectAggregate => "select_aggregate",
            QueryCategory::Join => "join",
            QueryCategory::SelectJoin => "select_join",
            QueryCategory::JoinAgg => "join_agg",
            QueryCategory::SelectJoinAgg => "select_join_agg",
            QueryCategory::JoinSimpleAgg => "join_simple_agg",
            QueryCategory::SelectJoinSimpleAgg => "select_join_simple_agg",
            QueryCategory::ComplexSelect => "complex_select",
            QueryCategory::ComplexSelectAgg => "complex_select_agg",
            QueryCategory::ComplexSelectJoin => "complex_select_join",
            QueryCategory::ComplexSelectJoinAgg => "complex_select_join_agg",
            QueryCategory::ComplexSelectJoinSimpleAgg => "complex_select_join_simple_agg",
            QueryCategory::Window => "window",
        }
    }

    pub fn from_dir_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.dir_name() == name)
    }

    /// Short label used in reports.
    pub fn short_name(self) -> &'static str {
        match self {
            QueryCategory::Fixed => "Fixed",
            QueryCategory::Select => "Se",
            QueryCategory::PseudoAggregate => "SiA",
            QueryCategory::Aggregate => "A",
            QueryCategory::SelectAggregate => "SeA",
            QueryCategory::Join => "J",
            QueryCategory::SelectJoin => "SeJ",
            QueryCategory::JoinAgg => "JA",
            QueryCategory::SelectJoinAgg => "SeJA",
            QueryCategory::JoinSimpleAgg => "JSiA",
            QueryCategory::SelectJoinSimpleAgg => "SeJSiA",
            QueryCategory::ComplexSelect => "CSe",
            QueryCategory::ComplexSelectAgg => "CSeA",
            QueryCategory::ComplexSelectJoin => "CSeJ",
            QueryCategory::ComplexSelectJoinAgg => "CSeJA",
            QueryCategory::ComplexSelectJoinSimpleAgg => "CSeJSiA",
            QueryCategory::Window => "W",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_names_round_trip() {
        for category in QueryCategory::ALL {
            assert_eq!(
                QueryCategory::from_dir_name(category.dir_name()),
                Some(category)
            );
        }
        assert_eq!(QueryCategory::from_dir_name("no_such_category"), None);
    }
}

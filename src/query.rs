//! Renders a search plan into the engine's structured query document.
//!
//! Two strategies share the same filter construction and differ only in
//! ranking: relevance wraps the bool query in a scoring function and sorts by
//! `_score`; recency sorts by the creation timestamp. Keyword text is always
//! passed as JSON data, never spliced into the document structure.

use serde_json::{json, Value};

use crate::engine::KEYWORD_ANALYZER;
use crate::node::NodeFilter;
use crate::plan::SearchPlan;
use crate::types::{MatchOperator, SortMode, SortOrder};

/// Analyzer for the exact-phrase scoring function.
const PHRASE_ANALYZER: &str = "ik_max_word";

const TITLE_BOOST: f64 = 3.0;
const CONTENT_BOOST: f64 = 2.0;
const REPLY_BOOST: f64 = 1.5;
const PHRASE_MATCH_WEIGHT: f64 = 50.0;

const HIGHLIGHT_FRAGMENT_SIZE: u32 = 80;

const SOURCE_FIELDS: [&str; 7] = [
    "title", "content", "created", "id", "node", "replies", "member",
];

pub fn compile(plan: &SearchPlan) -> Value {
    match plan.params.sort {
        SortMode::Relevance => relevance_body(plan),
        SortMode::Recency => recency_body(plan),
    }
}

/// Relevance strategy: engine-computed score (field boosts, phrase bonus,
/// stored `bonus` factor), sorted by `_score` in the requested order.
fn relevance_body(plan: &SearchPlan) -> Value {
    let keyword = &plan.params.keyword;
    json!({
        "from": plan.params.from,
        "size": plan.params.size,
        "sort": [sort_clause("_score", plan.params.order)],
        "highlight": highlight_block(),
        "_source": SOURCE_FIELDS,
        "query": {
            "function_score": {
                "query": bool_query(plan),
                "functions": [
                    {
                        "filter": {
                            "match_phrase": {
                                "all_content": {
                                    "query": keyword,
                                    "analyzer": PHRASE_ANALYZER,
                                    "slop": 0,
                                }
                            }
                        },
                        "weight": PHRASE_MATCH_WEIGHT,
                    },
                    {
                        "field_value_factor": {
                            "field": "bonus",
                            "missing": 0,
                            "modifier": "none",
                            "factor": 1,
                        }
                    },
                ],
                "score_mode": "sum",
                "boost_mode": "sum",
            }
        },
    })
}

/// Recency strategy: ranked by creation timestamp; scores are not requested.
fn recency_body(plan: &SearchPlan) -> Value {
    json!({
        "from": plan.params.from,
        "size": plan.params.size,
        "sort": [sort_clause("created", plan.params.order)],
        "highlight": highlight_block(),
        "_source": SOURCE_FIELDS,
        "query": { "bool": bool_query(plan)["bool"].clone() },
    })
}

fn sort_clause(field: &str, order: SortOrder) -> Value {
    json!({ field: { "order": order.as_str() } })
}

/// The shared bool query: full-text should clauses over the keyword plus
/// every filter the plan carries.
fn bool_query(plan: &SearchPlan) -> Value {
    let params = &plan.params;

    let mut filter: Vec<Value> = Vec::new();
    if params.gte.is_some() || params.lte.is_some() {
        let mut range = serde_json::Map::new();
        if let Some(gte) = params.gte {
            range.insert("gte".to_string(), json!(gte));
        }
        if let Some(lte) = params.lte {
            range.insert("lte".to_string(), json!(lte));
        }
        filter.push(json!({ "range": { "created": range } }));
    }
    if let NodeFilter::Include(ids) = &plan.nodes {
        filter.push(json!({ "terms": { "node": ids } }));
    }
    if let Some(username) = &params.username {
        filter.push(json!({ "term": { "member": username } }));
    }

    let mut must_not: Vec<Value> = vec![json!({ "term": { "deleted": true } })];
    if let NodeFilter::Exclude(ids) = &plan.nodes {
        must_not.push(json!({ "terms": { "node": ids } }));
    }

    json!({
        "bool": {
            "should": keyword_clauses(&params.keyword, params.operator),
            "minimum_should_match": 1,
            "filter": filter,
            "must_not": must_not,
        }
    })
}

fn keyword_clauses(keyword: &str, operator: MatchOperator) -> Value {
    json!([
        text_match("title", keyword, TITLE_BOOST, operator),
        {
            "bool": {
                "should": [
                    text_match("content", keyword, CONTENT_BOOST, operator),
                    {
                        "nested": {
                            "path": "postscript_list",
                            "score_mode": "max",
                            "query": text_match(
                                "postscript_list.content",
                                keyword,
                                CONTENT_BOOST,
                                operator,
                            ),
                        }
                    },
                ]
            }
        },
        text_match("all_reply", keyword, REPLY_BOOST, operator),
    ])
}

fn text_match(field: &str, keyword: &str, boost: f64, operator: MatchOperator) -> Value {
    json!({
        "match": {
            field: {
                "query": keyword,
                "analyzer": KEYWORD_ANALYZER,
                "operator": operator.as_str(),
                "boost": boost,
            }
        }
    })
}

fn highlight_block() -> Value {
    json!({
        "order": "score",
        "fragment_size": HIGHLIGHT_FRAGMENT_SIZE,
        "fields": {
            "title": { "number_of_fragments": 1 },
            "content": { "number_of_fragments": 1 },
            "postscript_list.content": { "number_of_fragments": 1 },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SearchParams;
    use crate::plan::HIDDEN_AUTHOR_LTE;

    fn plan(sort: SortMode) -> SearchPlan {
        SearchPlan {
            params: SearchParams {
                keyword: "rust 并发".to_string(),
                from: 20,
                size: 10,
                sort,
                order: SortOrder::Descending,
                gte: Some(1_400_000_000),
                lte: Some(1_500_000_000),
                node: String::new(),
                operator: MatchOperator::Or,
                username: Some("Mornlight".to_string()),
            },
            nodes: NodeFilter::Include(vec![1, 12]),
        }
    }

    #[test]
    fn relevance_sorts_by_score() {
        let body = compile(&plan(SortMode::Relevance));
        assert_eq!(body["sort"][0]["_score"]["order"], "desc");
        assert!(body["query"]["function_score"].is_object());
        assert_eq!(body["query"]["function_score"]["score_mode"], "sum");
    }

    #[test]
    fn recency_sorts_by_created_without_scoring_functions() {
        let mut p = plan(SortMode::Recency);
        p.params.order = SortOrder::Ascending;
        let body = compile(&p);
        assert_eq!(body["sort"][0]["created"]["order"], "asc");
        assert!(body["query"]["function_score"].is_null());
        assert!(body["query"]["bool"].is_object());
    }

    #[test]
    fn strategies_share_identical_filters() {
        let relevance = compile(&plan(SortMode::Relevance));
        let recency = compile(&plan(SortMode::Recency));
        assert_eq!(
            relevance["query"]["function_score"]["query"]["bool"],
            recency["query"]["bool"],
            "ranking must be the only difference between strategies"
        );
    }

    #[test]
    fn date_range_is_inclusive_and_optional_sides_are_omitted() {
        let mut p = plan(SortMode::Relevance);
        p.params.lte = None;
        let body = compile(&p);
        let range = &body["query"]["function_score"]["query"]["bool"]["filter"][0]["range"]["created"];
        assert_eq!(range["gte"], 1_400_000_000_i64);
        assert!(range.get("lte").is_none());
    }

    #[test]
    fn no_bounds_means_no_range_filter() {
        let mut p = plan(SortMode::Relevance);
        p.params.gte = None;
        p.params.lte = None;
        p.params.username = None;
        p.nodes = NodeFilter::None;
        let body = compile(&p);
        let filter = body["query"]["function_score"]["query"]["bool"]["filter"]
            .as_array()
            .unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn include_nodes_filter_and_exclude_nodes_must_not() {
        let included = compile(&plan(SortMode::Relevance));
        let filter = included["query"]["function_score"]["query"]["bool"]["filter"]
            .as_array()
            .unwrap();
        assert!(filter.iter().any(|f| f["terms"]["node"] == json!([1, 12])));

        let mut p = plan(SortMode::Relevance);
        p.nodes = NodeFilter::Exclude(vec![15]);
        let excluded = compile(&p);
        let bool_part = &excluded["query"]["function_score"]["query"]["bool"];
        let must_not = bool_part["must_not"].as_array().unwrap();
        assert!(must_not.iter().any(|f| f["terms"]["node"] == json!([15])));
        let filter = bool_part["filter"].as_array().unwrap();
        assert!(!filter.iter().any(|f| f.get("terms").is_some()));
    }

    #[test]
    fn deleted_topics_are_always_excluded() {
        let body = compile(&plan(SortMode::Recency));
        let must_not = body["query"]["bool"]["must_not"].as_array().unwrap();
        assert_eq!(must_not[0], json!({ "term": { "deleted": true } }));
    }

    #[test]
    fn author_term_uses_the_resolved_name() {
        let body = compile(&plan(SortMode::Relevance));
        let filter = body["query"]["function_score"]["query"]["bool"]["filter"]
            .as_array()
            .unwrap();
        assert!(filter
            .iter()
            .any(|f| f["term"]["member"] == "Mornlight"));
    }

    #[test]
    fn hidden_author_window_matches_nothing() {
        let mut p = plan(SortMode::Relevance);
        p.params.username = None;
        p.params.gte = None;
        p.params.lte = Some(HIDDEN_AUTHOR_LTE);
        let body = compile(&p);
        let bool_part = &body["query"]["function_score"]["query"]["bool"];
        assert_eq!(bool_part["filter"][0]["range"]["created"]["lte"], 1);
        assert!(!bool_part["filter"]
            .as_array()
            .unwrap()
            .iter()
            .any(|f| f.get("term").map(|t| t.get("member").is_some()).unwrap_or(false)));
    }

    #[test]
    fn and_operator_reaches_every_match_clause() {
        let mut p = plan(SortMode::Relevance);
        p.params.operator = MatchOperator::And;
        let body = compile(&p);
        let should = body["query"]["function_score"]["query"]["bool"]["should"]
            .as_array()
            .unwrap();
        assert_eq!(should[0]["match"]["title"]["operator"], "and");
        assert_eq!(should[1]["bool"]["should"][0]["match"]["content"]["operator"], "and");
        assert_eq!(should[2]["match"]["all_reply"]["operator"], "and");
    }

    #[test]
    fn keyword_is_data_never_structure() {
        let mut p = plan(SortMode::Relevance);
        p.params.keyword = r#""}], "malicious": {"match_all": {}} --"#.to_string();
        let body = compile(&p);

        // Round-trip through text: the document must stay well-formed and the
        // hostile keyword must come back as an ordinary string value.
        let text = serde_json::to_string(&body).unwrap();
        let reparsed: Value = serde_json::from_str(&text).unwrap();
        let title_query =
            &reparsed["query"]["function_score"]["query"]["bool"]["should"][0]["match"]["title"]["query"];
        assert_eq!(title_query.as_str().unwrap(), p.params.keyword);
        assert!(reparsed.get("malicious").is_none());
    }

    #[test]
    fn pagination_and_source_fields_carry_over() {
        let body = compile(&plan(SortMode::Relevance));
        assert_eq!(body["from"], 20);
        assert_eq!(body["size"], 10);
        assert_eq!(body["_source"], json!(SOURCE_FIELDS));
        assert_eq!(body["highlight"]["fragment_size"], 80);
    }
}

// Copyright 2026 Saucesort Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Conversion of both upstream response shapes into [`SearchResponse`].

use scraper::ElementRef;
use scraper::Html;
use scraper::Node;
use scraper::Selector;
use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

use crate::error::SearchError;
use crate::model::MatchRecord;
use crate::model::SearchResponse;

const BLOCK_SELECTOR: &str = "td.resulttablecontent";
const TITLE_SELECTOR: &str = "div.resulttitle";
const SIMILARITY_SELECTOR: &str = "div.resultsimilarityinfo";
const LINKS_SELECTOR: &str = "div.resultmiscinfo a[href]";
const CONTENT_SELECTOR: &str = "div.resultcontentcolumn";

/// Parse the markup results page. Every block must carry a similarity.
pub fn parse_markup(html: &str) -> Result<SearchResponse, SearchError> {
    let block_sel = selector(BLOCK_SELECTOR)?;
    let title_sel = selector(TITLE_SELECTOR)?;
    let similarity_sel = selector(SIMILARITY_SELECTOR)?;
    let links_sel = selector(LINKS_SELECTOR)?;
    let content_sel = selector(CONTENT_SELECTOR)?;

    let doc = Html::parse_document(html);
    let mut matches = Vec::new();
    for (idx, block) in doc.select(&block_sel).enumerate() {
        let title = block
            .select(&title_sel)
            .next()
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default();

        let raw_similarity = block
            .select(&similarity_sel)
            .next()
            .map(|el| el.text().collect::<String>())
            .ok_or_else(|| {
                SearchError::MalformedResponse(format!("result block {idx} has no similarity"))
            })?;
        let similarity = parse_similarity(&raw_similarity)?;

        let external_links = block
            .select(&links_sel)
            .filter_map(|a| a.value().attr("href"))
            .map(str::to_string)
            .collect();

        let content = block.select(&content_sel).map(text_with_breaks).collect();

        matches.push(MatchRecord {
            similarity,
            title,
            content,
            external_links,
            extra: Map::new(),
        });
    }

    sort_by_similarity(&mut matches);
    Ok(SearchResponse { matches })
}

fn selector(css: &str) -> Result<Selector, SearchError> {
    Selector::parse(css)
        .map_err(|err| SearchError::MalformedResponse(format!("selector {css}: {err}")))
}

/// Element text where each `<br>` becomes a single newline.
fn text_with_breaks(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in el.descendants() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(elem) if elem.name() == "br" => out.push('\n'),
            _ => {}
        }
    }
    out
}

fn parse_similarity(raw: &str) -> Result<f64, SearchError> {
    let cleaned = raw.replace('%', "");
    let cleaned = cleaned.trim();
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(SearchError::MalformedResponse(format!(
            "unparsable similarity {raw:?}"
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct StructuredEnvelope {
    #[serde(default)]
    results: Option<Vec<StructuredResult>>,
}

#[derive(Debug, Deserialize)]
struct StructuredResult {
    header: StructuredHeader,
    #[serde(default)]
    data: Option<StructuredData>,
}

#[derive(Debug, Deserialize)]
struct StructuredHeader {
    #[serde(default)]
    similarity: Option<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct StructuredData {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<ContentField>,
    #[serde(default)]
    ext_urls: Option<Vec<String>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentField {
    One(String),
    Many(Vec<String>),
}

/// Parse the structured (JSON) response body.
pub fn parse_structured(body: &str) -> Result<SearchResponse, SearchError> {
    let envelope: StructuredEnvelope = serde_json::from_str(body)
        .map_err(|err| SearchError::MalformedResponse(format!("structured body: {err}")))?;

    let mut matches = Vec::new();
    for (idx, result) in envelope.results.unwrap_or_default().into_iter().enumerate() {
        let similarity = match result.header.similarity {
            Some(Value::String(s)) => parse_similarity(&s)?,
            Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()).ok_or_else(|| {
                SearchError::MalformedResponse(format!("result {idx} has a non-finite similarity"))
            })?,
            _ => {
                return Err(SearchError::MalformedResponse(format!(
                    "result {idx} has no similarity"
                )));
            }
        };

        let data = result.data.unwrap_or_default();
        let mut extra = result.header.extra;
        extra.extend(data.extra);

        let content = match data.content {
            Some(ContentField::One(text)) => vec![text],
            Some(ContentField::Many(blocks)) => blocks,
            None => Vec::new(),
        };

        matches.push(MatchRecord {
            similarity,
            title: data.title.unwrap_or_default(),
            content,
            external_links: data.ext_urls.unwrap_or_default(),
            extra,
        });
    }

    sort_by_similarity(&mut matches);
    Ok(SearchResponse { matches })
}

/// Descending by similarity; equal values keep encounter order.
pub fn sort_by_similarity(records: &mut [MatchRecord]) {
    records.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
}

/// Pair records by index and union each pair, structured fields winning.
///
/// Records past the shorter list's length are dropped. An empty structured
/// title, content or link list does not overwrite the markup value, so text
/// only the markup page carries survives the union.
pub fn merge_results(markup: Vec<MatchRecord>, structured: Vec<MatchRecord>) -> Vec<MatchRecord> {
    markup
        .into_iter()
        .zip(structured)
        .map(|(mut base, overlay)| {
            base.merge_from(overlay);
            base
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const MARKUP: &str = r#"<html><body><div id="middle">
<table class="resulttable"><tr>
<td class="resulttablecontent">
  <div class="resultmatchinfo">
    <div class="resultsimilarityinfo">70.5%</div>
    <div class="resultmiscinfo"><a href="https://danbooru.example/post/1">db</a><a href="https://gelbooru.example/2">gb</a></div>
  </div>
  <div class="resultcontent">
    <div class="resulttitle"><strong>Creator: </strong>somebody</div>
    <div class="resultcontentcolumn"><strong>Material: </strong>original<br/>clannad<br/></div>
  </div>
</td></tr></table>
<table class="resulttable"><tr>
<td class="resulttablecontent">
  <div class="resultmatchinfo">
    <div class="resultsimilarityinfo">92.1%</div>
    <div class="resultmiscinfo"></div>
  </div>
  <div class="resultcontent">
    <div class="resultcontentcolumn">Pixiv ID: 123<br>Member: artist</div>
    <div class="resultcontentcolumn">Characters: nagisa</div>
  </div>
</td></tr></table>
</div></body></html>"#;

    #[test]
    fn markup_blocks_are_parsed_and_sorted() {
        let response = parse_markup(MARKUP).expect("parse");
        assert_eq!(response.matches.len(), 2);

        let first = &response.matches[0];
        assert_eq!(first.similarity, 92.1);
        assert_eq!(first.title, "");
        assert!(first.external_links.is_empty());
        assert_eq!(
            first.content,
            vec![
                "Pixiv ID: 123\nMember: artist".to_string(),
                "Characters: nagisa".to_string()
            ]
        );

        let second = &response.matches[1];
        assert_eq!(second.similarity, 70.5);
        assert_eq!(second.title, "Creator: somebody");
        assert_eq!(
            second.external_links,
            vec![
                "https://danbooru.example/post/1".to_string(),
                "https://gelbooru.example/2".to_string()
            ]
        );
        assert_eq!(second.content, vec!["Material: original\nclannad\n".to_string()]);
    }

    #[test]
    fn markup_without_blocks_is_empty() {
        let response = parse_markup("<html><body>nothing</body></html>").expect("parse");
        assert!(response.is_empty());
    }

    #[test]
    fn markup_missing_similarity_is_rejected() {
        let html = r#"<table><tr><td class="resulttablecontent"><div class="resulttitle">x</div></td></tr></table>"#;
        let err = parse_markup(html).unwrap_err();
        assert!(matches!(err, SearchError::MalformedResponse(_)));
    }

    #[test]
    fn markup_unparsable_similarity_is_rejected() {
        let html = r#"<table><tr><td class="resulttablecontent"><div class="resultsimilarityinfo">n/a%</div></td></tr></table>"#;
        let err = parse_markup(html).unwrap_err();
        assert!(matches!(err, SearchError::MalformedResponse(_)));
    }

    #[test]
    fn structured_body_is_parsed_and_sorted() {
        let body = json!({
            "header": {"status": 0},
            "results": [
                {"header": {"similarity": "64.90", "index_id": 5},
                 "data": {"title": "low", "ext_urls": ["https://pixiv.example/1"], "member_name": "artist"}},
                {"header": {"similarity": "92.00"},
                 "data": {"content": "Material: clannad"}},
                {"header": {"similarity": 70}, "data": {}}
            ]
        })
        .to_string();

        let response = parse_structured(&body).expect("parse");
        let sims: Vec<f64> = response.matches.iter().map(|r| r.similarity).collect();
        assert_eq!(sims, vec![92.0, 70.0, 64.9]);
        assert_eq!(response.matches[0].content, vec!["Material: clannad".to_string()]);
        let low = &response.matches[2];
        assert_eq!(low.title, "low");
        assert_eq!(low.extra.get("member_name"), Some(&json!("artist")));
        assert_eq!(low.extra.get("index_id"), Some(&json!(5)));
    }

    #[test]
    fn structured_without_results_is_empty() {
        let response = parse_structured(r#"{"header": {"status": 0}}"#).expect("parse");
        assert!(response.is_empty());
    }

    #[test]
    fn structured_missing_similarity_is_rejected() {
        let err = parse_structured(r#"{"results": [{"header": {}, "data": {}}]}"#).unwrap_err();
        assert!(matches!(err, SearchError::MalformedResponse(_)));
    }

    #[test]
    fn structured_null_data_keeps_the_record() {
        let body = json!({"results": [
            {"header": {"similarity": "91", "index_id": 5}, "data": null},
            {"header": {"similarity": "80"}, "data": {"title": "kept"}}
        ]})
        .to_string();
        let response = parse_structured(&body).expect("parse");
        assert_eq!(response.matches.len(), 2);
        let first = &response.matches[0];
        assert_eq!(first.similarity, 91.0);
        assert!(first.title.is_empty());
        assert!(first.content.is_empty());
        assert_eq!(first.extra.get("index_id"), Some(&json!(5)));
        assert_eq!(response.matches[1].title, "kept");
    }

    #[test]
    fn merge_keeps_markup_fields_when_structured_ones_are_empty() {
        let mut markup = MatchRecord::new(90.0);
        markup.title = "markup".to_string();
        markup.external_links = vec!["a".to_string()];
        let mut structured = MatchRecord::new(91.0);
        structured.extra.insert("member_name".to_string(), json!("artist"));

        let merged = merge_results(vec![markup], vec![structured]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title, "markup");
        assert_eq!(merged[0].external_links, vec!["a".to_string()]);
        assert_eq!(merged[0].similarity, 91.0);
        assert_eq!(merged[0].extra.get("member_name"), Some(&json!("artist")));
    }

    #[test]
    fn sort_is_stable_for_ties() {
        let mut records: Vec<MatchRecord> = [50.0, 80.0, 80.0, 95.0, 50.0]
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let mut r = MatchRecord::new(*s);
                r.title = format!("r{i}");
                r
            })
            .collect();
        sort_by_similarity(&mut records);
        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["r3", "r1", "r2", "r0", "r4"]);
    }

    #[test]
    fn merge_truncates_to_shorter_list() {
        let markup: Vec<MatchRecord> = (0..3)
            .map(|i| {
                let mut r = MatchRecord::new(90.0 - i as f64);
                r.title = format!("markup {i}");
                r.content = vec![format!("Material: series {i}")];
                r
            })
            .collect();
        let structured: Vec<MatchRecord> = (0..5)
            .map(|i| {
                let mut r = MatchRecord::new(89.5 - i as f64);
                r.title = format!("structured {i}");
                r
            })
            .collect();

        let merged = merge_results(markup, structured);
        assert_eq!(merged.len(), 3);
        for (i, record) in merged.iter().enumerate() {
            assert_eq!(record.title, format!("structured {i}"));
            assert_eq!(record.similarity, 89.5 - i as f64);
            assert_eq!(record.content, vec![format!("Material: series {i}")]);
        }
    }
}

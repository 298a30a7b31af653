//! arXiv Atom feed parsing.
//!
//! Turns one API response body into papers plus the reported total. Uses
//! quick-xml's namespace-resolving reader so the arXiv and OpenSearch
//! extension elements are matched by namespace URI, not by whatever prefix
//! the document happens to use.
//!
//! Lookups follow the arXiv response shape:
//!
//! - `entry` and its Atom children (`id`, `title`, `summary`, `published`,
//!   `updated`, `author/name`, `category/@term`) match on local name in the
//!   Atom namespace (or no namespace at all). An undeclared prefix matches
//!   nothing.
//! - `arxiv:primary_category/@term` must be in `http://arxiv.org/schemas/atom`.
//! - `opensearch:totalResults` must be in
//!   `http://a9.com/-/spec/opensearch/1.1/` and is only read at feed level.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use std::fmt::Display;

use crate::models::{normalize_whitespace, strip_arxiv_id, Paper, PaperBuilder};
use crate::sources::FeedError;

/// Atom namespace
pub const ATOM_NS: &[u8] = b"http://www.w3.org/2005/Atom";
/// arXiv extension namespace (`primary_category`, `comment`, `doi`, ...)
pub const ARXIV_NS: &[u8] = b"http://arxiv.org/schemas/atom";
/// OpenSearch namespace (`totalResults`, `startIndex`, `itemsPerPage`)
pub const OPENSEARCH_NS: &[u8] = b"http://a9.com/-/spec/opensearch/1.1/";

/// Stands in for an undeclared prefix; no real namespace is empty, so it
/// matches none of the above.
const UNDECLARED_NS: &[u8] = b"";

/// arXiv reports request errors as entries whose id lives here
const ARXIV_ERROR_ID: &str = "arxiv.org/api/errors";

/// Parsed contents of one Atom response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomFeed {
    /// Papers in document order
    pub papers: Vec<Paper>,

    /// `opensearch:totalResults`, or 0 when absent or unparsable
    pub total_results: usize,
}

/// Parse an arXiv Atom document.
///
/// Fails only when the document is not well-formed XML. Missing fields yield
/// empty values rather than errors.
pub fn parse_feed(xml: &str) -> Result<AtomFeed, FeedError> {
    let mut reader = NsReader::from_str(xml);
    let mut parser = FeedParser::default();

    loop {
        let (resolved, event) = reader.read_resolved_event()?;
        let ns = match resolved {
            ResolveResult::Bound(ns) => Some(ns.0),
            ResolveResult::Unbound => None,
            ResolveResult::Unknown(_) => Some(UNDECLARED_NS),
        };

        match event {
            Event::Start(ref e) => parser.open(ns, e, false)?,
            Event::Empty(ref e) => parser.open(ns, e, true)?,
            Event::End(_) => parser.close(),
            Event::Text(ref e) if parser.depth == 0 => {
                if !e.iter().all(u8::is_ascii_whitespace) {
                    return Err(outside_root());
                }
            }
            Event::CData(_) if parser.depth == 0 => return Err(outside_root()),
            Event::Text(ref e) => {
                if parser.capturing() {
                    let text = e.unescape().map_err(xml_error)?;
                    parser.text.push_str(&text);
                }
            }
            Event::CData(ref e) => {
                if parser.capturing() {
                    parser.text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    parser.finish()
}

fn xml_error(err: impl Display) -> FeedError {
    FeedError::Parse(format!("XML: {}", err))
}

fn outside_root() -> FeedError {
    FeedError::Parse("XML: text outside the root element".to_string())
}

/// Text-bearing elements we collect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Title,
    Summary,
    Published,
    Updated,
    AuthorName,
    TotalResults,
}

/// Fields of the entry being read; `None` means not seen yet, so the first
/// occurrence wins.
#[derive(Debug, Default)]
struct EntryDraft {
    id: Option<String>,
    title: Option<String>,
    summary: Option<String>,
    published: Option<String>,
    updated: Option<String>,
    authors: Vec<String>,
    categories: Vec<String>,
    primary_category: Option<String>,
}

impl EntryDraft {
    fn into_paper(self) -> Option<Paper> {
        let raw_id = self.id.unwrap_or_default();
        if raw_id.contains(ARXIV_ERROR_ID) {
            tracing::warn!(
                "Skipping arXiv error entry: {}",
                self.summary.as_deref().unwrap_or(&raw_id)
            );
            return None;
        }

        let id = strip_arxiv_id(&raw_id);
        if id.is_empty() {
            tracing::warn!("Skipping Atom entry without an id");
            return None;
        }

        let mut builder = PaperBuilder::new(id)
            .title(self.title.as_deref().unwrap_or_default())
            .abstract_text(self.summary.as_deref().unwrap_or_default())
            .authors(self.authors)
            .published_date(self.published.unwrap_or_default())
            .updated_date(self.updated.unwrap_or_default())
            .categories(self.categories);
        if let Some(primary) = self.primary_category.filter(|p| !p.is_empty()) {
            builder = builder.primary_category(primary);
        }

        Some(builder.build())
    }
}

#[derive(Debug, Default)]
struct FeedParser {
    depth: usize,
    saw_root: bool,
    entry: Option<(EntryDraft, usize)>,
    author_depth: Option<usize>,
    capture: Option<(Field, usize)>,
    text: String,
    papers: Vec<Paper>,
    total_results: Option<usize>,
}

impl FeedParser {
    fn capturing(&self) -> bool {
        self.capture.is_some()
    }

    fn draft(&mut self) -> Option<&mut EntryDraft> {
        self.entry.as_mut().map(|(draft, _)| draft)
    }

    /// Handle a start tag, or a self-closing tag when `empty` is set.
    fn open(&mut self, ns: Option<&[u8]>, e: &BytesStart<'_>, empty: bool) -> Result<(), FeedError> {
        if self.depth == 0 {
            if self.saw_root {
                return Err(FeedError::Parse(
                    "XML: multiple root elements".to_string(),
                ));
            }
            self.saw_root = true;
        }

        let depth = self.depth + 1;
        let local = e.local_name();
        let local = local.as_ref();
        let atom = ns.is_none() || ns == Some(ATOM_NS);

        match self.entry {
            None => {
                if atom && local == b"entry" {
                    self.entry = Some((EntryDraft::default(), depth));
                } else if ns == Some(OPENSEARCH_NS)
                    && local == b"totalResults"
                    && self.total_results.is_none()
                {
                    self.start_capture(Field::TotalResults, depth);
                }
            }
            Some((_, entry_depth)) => {
                let child = depth == entry_depth + 1;
                if atom {
                    match local {
                        b"id" if child => self.start_capture(Field::Id, depth),
                        b"title" if child => self.start_capture(Field::Title, depth),
                        b"summary" if child => self.start_capture(Field::Summary, depth),
                        b"published" if child => self.start_capture(Field::Published, depth),
                        b"updated" if child => self.start_capture(Field::Updated, depth),
                        b"author" if child => self.author_depth = Some(depth),
                        b"name" if self.author_depth == Some(depth - 1) => {
                            self.start_capture(Field::AuthorName, depth)
                        }
                        b"category" => {
                            if let (Some(term), Some(draft)) = (term_attribute(e)?, self.draft()) {
                                draft.categories.push(term);
                            }
                        }
                        _ => {}
                    }
                } else if ns == Some(ARXIV_NS) && local == b"primary_category" {
                    let term = term_attribute(e)?;
                    if let Some(draft) = self.draft() {
                        if draft.primary_category.is_none() {
                            draft.primary_category = term;
                        }
                    }
                }
            }
        }

        if empty {
            // a self-closing text element still counts as seen, with no text
            if self.capture.is_some_and(|(_, d)| d == depth) {
                self.end_capture();
            }
            if self.author_depth == Some(depth) {
                self.author_depth = None;
            }
            if self.entry.as_ref().is_some_and(|(_, d)| *d == depth) {
                self.end_entry();
            }
        } else {
            self.depth = depth;
        }

        Ok(())
    }

    fn close(&mut self) {
        let depth = self.depth;

        if self.capture.is_some_and(|(_, d)| d == depth) {
            self.end_capture();
        }
        if self.author_depth == Some(depth) {
            self.author_depth = None;
        }
        if self.entry.as_ref().is_some_and(|(_, d)| *d == depth) {
            self.end_entry();
        }

        self.depth = depth.saturating_sub(1);
    }

    fn start_capture(&mut self, field: Field, depth: usize) {
        if self.capture.is_none() {
            self.capture = Some((field, depth));
            self.text.clear();
        }
    }

    fn end_capture(&mut self) {
        let Some((field, _)) = self.capture.take() else {
            return;
        };
        let text = std::mem::take(&mut self.text);

        if field == Field::TotalResults {
            self.total_results = Some(text.trim().parse().unwrap_or(0));
            return;
        }

        let Some((draft, _)) = self.entry.as_mut() else {
            return;
        };
        let slot = match field {
            Field::Id => &mut draft.id,
            Field::Title => &mut draft.title,
            Field::Summary => &mut draft.summary,
            Field::Published => &mut draft.published,
            Field::Updated => &mut draft.updated,
            Field::AuthorName => {
                let name = normalize_whitespace(&text);
                if !name.is_empty() {
                    draft.authors.push(name);
                }
                return;
            }
            Field::TotalResults => return,
        };
        if slot.is_none() {
            *slot = Some(text.trim().to_string());
        }
    }

    fn end_entry(&mut self) {
        if let Some((draft, _)) = self.entry.take() {
            if let Some(paper) = draft.into_paper() {
                self.papers.push(paper);
            }
        }
        self.author_depth = None;
    }

    fn finish(self) -> Result<AtomFeed, FeedError> {
        if !self.saw_root {
            return Err(FeedError::Parse("XML: no root element".to_string()));
        }
        if self.depth != 0 {
            return Err(FeedError::Parse(
                "XML: unexpected end of document".to_string(),
            ));
        }

        tracing::debug!(
            "Parsed Atom feed: {} entries, {:?} total",
            self.papers.len(),
            self.total_results
        );

        Ok(AtomFeed {
            papers: self.papers,
            total_results: self.total_results.unwrap_or(0),
        })
    }
}

/// The `term` attribute of a `category`-style element
fn term_attribute(e: &BytesStart<'_>) -> Result<Option<String>, FeedError> {
    for attr in e.attributes() {
        let attr = attr.map_err(xml_error)?;
        if attr.key.local_name().as_ref() == b"term" {
            let value = attr.unescape_value().map_err(xml_error)?;
            let value = value.trim();
            return Ok((!value.is_empty()).then(|| value.to_string()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <link href="http://arxiv.org/api/query?search_query%3Dcat%3Acs.AI" rel="self" type="application/atom+xml"/>
  <title type="html">ArXiv Query: search_query=cat:cs.AI</title>
  <id>http://arxiv.org/api/cHxbiOdZaP56ODnBPIenZhzg5f8</id>
  <updated>2024-01-16T00:00:00-05:00</updated>
  <opensearch:totalResults xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">1523</opensearch:totalResults>
  <opensearch:startIndex xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">0</opensearch:startIndex>
  <opensearch:itemsPerPage xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">2</opensearch:itemsPerPage>
  <entry>
    <id>http://arxiv.org/abs/2301.12345v2</id>
    <updated>2023-02-01T12:00:00Z</updated>
    <published>2023-01-15T10:00:00Z</published>
    <title>Scaling Laws
      for Feed Parsers</title>
    <summary>  line one
   line two
    </summary>
    <author>
      <name>Ada Lovelace</name>
      <arxiv:affiliation xmlns:arxiv="http://arxiv.org/schemas/atom">Analytical Engines</arxiv:affiliation>
    </author>
    <author>
      <name>Charles Babbage</name>
    </author>
    <arxiv:comment xmlns:arxiv="http://arxiv.org/schemas/atom">12 pages</arxiv:comment>
    <link href="http://arxiv.org/abs/2301.12345v2" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/2301.12345v2" rel="related" type="application/pdf"/>
    <arxiv:primary_category xmlns:arxiv="http://arxiv.org/schemas/atom" term="cs.LG" scheme="http://arxiv.org/schemas/atom"/>
    <category term="cs.AI" scheme="http://arxiv.org/schemas/atom"/>
    <category term="cs.LG" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2301.00001v1</id>
    <updated>2023-01-02T00:00:00Z</updated>
    <published>2023-01-01T00:00:00Z</published>
    <title>Second &amp; Last</title>
    <summary>Short.</summary>
    <author><name>Grace Hopper</name></author>
    <category term="cs.SE" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_entries_in_document_order() {
        let feed = parse_feed(FEED).unwrap();

        assert_eq!(feed.papers.len(), 2);
        assert_eq!(feed.papers[0].id, "2301.12345");
        assert_eq!(feed.papers[1].id, "2301.00001");
        assert_eq!(feed.total_results, 1523);
    }

    #[test]
    fn test_parse_entry_fields() {
        let feed = parse_feed(FEED).unwrap();
        let paper = &feed.papers[0];

        assert_eq!(paper.title, "Scaling Laws for Feed Parsers");
        assert_eq!(paper.r#abstract, "line one line two");
        assert_eq!(paper.authors, vec!["Ada Lovelace", "Charles Babbage"]);
        assert_eq!(paper.published_date, "2023-01-15T10:00:00Z");
        assert_eq!(paper.updated_date, "2023-02-01T12:00:00Z");
        assert_eq!(paper.categories, vec!["cs.AI", "cs.LG"]);
        assert_eq!(paper.primary_category, "cs.LG");
        assert_eq!(paper.pdf_url, "https://arxiv.org/pdf/2301.12345.pdf");
        assert_eq!(paper.arxiv_url, "https://arxiv.org/abs/2301.12345");
        assert!(paper.thumbnail.is_none());
    }

    #[test]
    fn test_entities_unescaped() {
        let feed = parse_feed(FEED).unwrap();
        assert_eq!(feed.papers[1].title, "Second & Last");
    }

    #[test]
    fn test_primary_category_falls_back_to_first_category() {
        let feed = parse_feed(FEED).unwrap();
        assert_eq!(feed.papers[1].primary_category, "cs.SE");
    }

    #[test]
    fn test_primary_category_requires_arxiv_namespace() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom" xmlns:x="urn:other">
  <entry>
    <id>http://arxiv.org/abs/2301.00002v1</id>
    <x:primary_category term="math.CO"/>
    <category term="cs.DS"/>
  </entry>
</feed>"#;
        let feed = parse_feed(xml).unwrap();
        assert_eq!(feed.papers[0].primary_category, "cs.DS");
    }

    #[test]
    fn test_undeclared_prefix_is_not_atom() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><entry><id>http://arxiv.org/abs/1</id><x:title>Wrong</x:title><title>Right</title></entry></feed>"#;
        let feed = parse_feed(xml).unwrap();
        assert_eq!(feed.papers[0].title, "Right");

        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><x:entry><id>http://arxiv.org/abs/2</id></x:entry></feed>"#;
        assert!(parse_feed(xml).unwrap().papers.is_empty());
    }

    #[test]
    fn test_prefix_independent_namespaces() {
        let xml = r#"<atom:feed xmlns:atom="http://www.w3.org/2005/Atom"
    xmlns:os="http://a9.com/-/spec/opensearch/1.1/"
    xmlns:ax="http://arxiv.org/schemas/atom">
  <os:totalResults>7</os:totalResults>
  <atom:entry>
    <atom:id>http://arxiv.org/abs/2401.00003v3</atom:id>
    <atom:title>Prefixed</atom:title>
    <ax:primary_category term="cs.CV"/>
  </atom:entry>
</atom:feed>"#;
        let feed = parse_feed(xml).unwrap();

        assert_eq!(feed.total_results, 7);
        assert_eq!(feed.papers[0].id, "2401.00003");
        assert_eq!(feed.papers[0].title, "Prefixed");
        assert_eq!(feed.papers[0].primary_category, "cs.CV");
        assert!(feed.papers[0].categories.is_empty());
    }

    #[test]
    fn test_entry_without_authors_or_categories() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/abs/2301.00004</id>
    <title>Lonely</title>
  </entry>
</feed>"#;
        let feed = parse_feed(xml).unwrap();
        let paper = &feed.papers[0];

        assert!(paper.authors.is_empty());
        assert!(paper.categories.is_empty());
        assert_eq!(paper.primary_category, "");
        assert_eq!(paper.r#abstract, "");
        assert_eq!(paper.published_date, "");
    }

    #[test]
    fn test_zero_entries() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <opensearch:totalResults xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">0</opensearch:totalResults>
</feed>"#;
        let feed = parse_feed(xml).unwrap();
        assert!(feed.papers.is_empty());
        assert_eq!(feed.total_results, 0);
    }

    #[test]
    fn test_total_results_missing_or_garbage() {
        let missing = r#"<feed xmlns="http://www.w3.org/2005/Atom"><entry><id>http://arxiv.org/abs/1</id></entry></feed>"#;
        assert_eq!(parse_feed(missing).unwrap().total_results, 0);

        let garbage = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <opensearch:totalResults xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">lots</opensearch:totalResults>
</feed>"#;
        assert_eq!(parse_feed(garbage).unwrap().total_results, 0);
    }

    #[test]
    fn test_total_results_ignores_other_namespaces() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <totalResults>99</totalResults>
</feed>"#;
        assert_eq!(parse_feed(xml).unwrap().total_results, 0);
    }

    #[test]
    fn test_nested_ids_are_not_entry_ids() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <source><id>http://example.com/elsewhere</id></source>
    <id>http://arxiv.org/abs/2301.00005v1</id>
  </entry>
</feed>"#;
        assert_eq!(parse_feed(xml).unwrap().papers[0].id, "2301.00005");
    }

    #[test]
    fn test_error_entry_skipped() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/api/errors#incorrect_id_format_for_bogus</id>
    <title>Error</title>
    <summary>incorrect id format for bogus</summary>
  </entry>
</feed>"#;
        assert!(parse_feed(xml).unwrap().papers.is_empty());
    }

    #[test]
    fn test_entry_without_id_skipped() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <entry><title>No id</title></entry>
  <entry><id>http://arxiv.org/abs/2301.00006</id></entry>
</feed>"#;
        let feed = parse_feed(xml).unwrap();
        assert_eq!(feed.papers.len(), 1);
        assert_eq!(feed.papers[0].id, "2301.00006");
    }

    #[test]
    fn test_malformed_xml_fails() {
        assert!(matches!(
            parse_feed("<feed><entry></feed>"),
            Err(FeedError::Parse(_))
        ));
        assert!(matches!(
            parse_feed("<feed><entry>"),
            Err(FeedError::Parse(_))
        ));
        assert!(matches!(
            parse_feed("Rate exceeded."),
            Err(FeedError::Parse(_))
        ));
        assert!(matches!(parse_feed(""), Err(FeedError::Parse(_))));
    }

    #[test]
    fn test_text_after_root_fails() {
        let atom = r#"<feed xmlns="http://www.w3.org/2005/Atom"></feed>"#;

        assert!(matches!(
            parse_feed(&format!("{}junk", atom)),
            Err(FeedError::Parse(_))
        ));
        assert!(matches!(
            parse_feed(&format!("{}<![CDATA[junk]]>", atom)),
            Err(FeedError::Parse(_))
        ));
        assert!(parse_feed(&format!("{}\n  \n", atom)).is_ok());
        assert!(parse_feed(&format!("\n{}<!-- trailer -->\n", atom)).is_ok());
    }
}

use scraper::{ElementRef, Html, Selector};
use tracing::error;
use url::Url;

use crate::record::{Field, Record};
use crate::{Error, Result};

const LISTING_SELECTOR: &str = "div.wrapper";

/// How a field is pulled out of a listing block.
#[derive(Clone, Copy)]
pub(crate) enum Extractor {
    /// The returned text is the field value.
    Text(fn(ElementRef<'_>) -> Result<String>),
    /// The returned href points to a map page that holds the actual value.
    MapLink(fn(ElementRef<'_>) -> Result<String>),
}

/// Fixed extraction table, in export column order.
pub(crate) const EXTRACTORS: [(Field, Extractor); 5] = [
    (Field::Name, Extractor::Text(extract_name)),
    (Field::Phone, Extractor::Text(extract_phone)),
    (Field::Website, Extractor::Text(extract_website)),
    (Field::ShortAddress, Extractor::Text(extract_short_address)),
    (Field::LongAddress, Extractor::MapLink(extract_map_link)),
];

/// A listing block after the synchronous pass. `map_links` still have to be
/// resolved over the network before the record is complete.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Listing {
    pub(crate) record: Record,
    pub(crate) map_links: Vec<(Field, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Page {
    Listings(Vec<Listing>),
    /// The page had no listing blocks: pagination is exhausted.
    EndOfData,
}

/// Parses one directory page.
/// Map links are made absolute against `base`. A field that fails to extract is
/// logged and left out, the rest of its record is kept.
pub(crate) fn parse_page(html: &str, base: &Url) -> Result<Page> {
    let doc = Html::parse_document(html);
    let listing_selector = create_selector(LISTING_SELECTOR)?;

    let mut listings = Vec::new();
    for block in doc.select(&listing_selector) {
        let mut listing = Listing {
            record: Record::new(),
            map_links: Vec::new(),
        };

        for (field, extractor) in EXTRACTORS {
            let extracted = match extractor {
                Extractor::Text(extract) => extract(block).map(|text| listing.record.insert(field, text)),
                Extractor::MapLink(extract) => extract(block)
                    .and_then(|href| base.join(&href).map_err(Error::from))
                    .map(|uri| listing.map_links.push((field, uri.into()))),
            };
            if let Err(err) = extracted {
                error!("Error extracting {field}, {err}");
            }
        }

        listings.push(listing);
    }

    if listings.is_empty() {
        return Ok(Page::EndOfData);
    }
    Ok(Page::Listings(listings))
}

#[inline]
pub(crate) fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::InvalidSelector(sel_str.into()))
}

fn select_first<'a>(el: ElementRef<'a>, field: Field, sel_str: &str) -> Result<ElementRef<'a>> {
    let selector = create_selector(sel_str)?;
    let found = el.select(&selector).next();
    found.ok_or_else(|| Error::MissingElement {
        field,
        selector: sel_str.into(),
    })
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn element_href(el: ElementRef<'_>, field: Field) -> Result<String> {
    el.value()
        .attr("href")
        .map(|href| href.trim().to_string())
        .ok_or(Error::MissingAttribute { field, attr: "href" })
}

fn extract_name(block: ElementRef<'_>) -> Result<String> {
    let heading = select_first(block, Field::Name, "h2")?;
    select_first(heading, Field::Name, "a").map(element_text)
}

fn extract_phone(block: ElementRef<'_>) -> Result<String> {
    select_first(block, Field::Phone, "li.tel").map(element_text)
}

fn extract_website(block: ElementRef<'_>) -> Result<String> {
    let item = select_first(block, Field::Website, "li.www.hidden-phone")?;
    let link = select_first(item, Field::Website, "a")?;
    element_href(link, Field::Website)
}

fn extract_short_address(block: ElementRef<'_>) -> Result<String> {
    select_first(block, Field::ShortAddress, "li.address").map(element_text)
}

fn extract_map_link(block: ElementRef<'_>) -> Result<String> {
    let link = select_first(block, Field::LongAddress, "a.lead.lead-cs_hl_hit_map")?;
    element_href(link, Field::LongAddress)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_BLOCK: &str = r#"
        <div class="wrapper">
            <h2><a href="/firma/nowak">Tartak Nowak &amp; Syn</a></h2>
            <ul>
                <li class="tel"> 12 345 67 89 </li>
                <li class="www hidden-phone"><a href="http://nowak.pl">nowak.pl</a></li>
                <li class="address">Kraków</li>
            </ul>
            <a class="lead lead-cs_hl_hit_map" href="/mapa/nowak">pokaż na mapie</a>
        </div>"#;

    const PARTIAL_BLOCK: &str = r#"
        <div class="wrapper">
            <h2><a>Tartak Kowalski</a></h2>
            <ul><li class="address">Gdańsk</li></ul>
        </div>"#;

    fn base() -> Url {
        Url::parse("http://budownictwo.pl").unwrap()
    }

    fn page(blocks: &[&str]) -> String {
        format!(
            "<html><body><div id=\"results\">{}</div><div class=\"footer\">x</div></body></html>",
            blocks.concat()
        )
    }

    #[test]
    fn extracts_every_field_of_a_full_block() {
        let Page::Listings(listings) = parse_page(&page(&[FULL_BLOCK]), &base()).unwrap() else {
            panic!("expected listings");
        };
        assert_eq!(listings.len(), 1);

        let listing = &listings[0];
        assert_eq!(listing.record.get(Field::Name), Some("Tartak Nowak & Syn"));
        assert_eq!(listing.record.get(Field::Phone), Some("12 345 67 89"));
        assert_eq!(listing.record.get(Field::Website), Some("http://nowak.pl"));
        assert_eq!(listing.record.get(Field::ShortAddress), Some("Kraków"));
        assert_eq!(listing.record.get(Field::LongAddress), None);
        assert_eq!(
            listing.map_links,
            vec![(Field::LongAddress, "http://budownictwo.pl/mapa/nowak".to_string())]
        );
    }

    #[test]
    fn missing_fields_keep_the_record() {
        let Page::Listings(listings) = parse_page(&page(&[PARTIAL_BLOCK, FULL_BLOCK]), &base()).unwrap() else {
            panic!("expected listings");
        };
        assert_eq!(listings.len(), 2);

        let partial = &listings[0];
        assert_eq!(partial.record.get(Field::Name), Some("Tartak Kowalski"));
        assert_eq!(partial.record.get(Field::ShortAddress), Some("Gdańsk"));
        assert_eq!(partial.record.get(Field::Phone), None);
        assert_eq!(partial.record.get(Field::Website), None);
        assert!(partial.map_links.is_empty());
    }

    #[test]
    fn page_without_blocks_is_end_of_data() {
        let html = "<html><body><p>Brak wyników</p><div class=\"wrapper-other\"></div></body></html>";
        assert_eq!(parse_page(html, &base()).unwrap(), Page::EndOfData);
    }

    #[test]
    fn extraction_table_follows_column_order() {
        let fields: Vec<_> = EXTRACTORS.iter().map(|(field, _)| *field).collect();
        assert_eq!(fields, Field::ALL.to_vec());
    }
}

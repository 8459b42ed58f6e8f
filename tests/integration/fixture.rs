//! A tiny catalog site served by wiremock

use shelfscan::config::Config;
use std::collections::HashMap;
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Clone)]
pub struct FixtureBook {
    pub slug: String,
    pub title: String,
    pub price: String,
    pub rating: &'static str,
    pub availability: &'static str,
}

impl FixtureBook {
    pub fn new(slug: &str, title: &str, price: &str, rating: &'static str) -> Self {
        Self {
            slug: slug.to_string(),
            title: title.to_string(),
            price: price.to_string(),
            rating,
            availability: "In stock (3 available)",
        }
    }

    pub fn out_of_stock(mut self) -> Self {
        self.availability = "Out of stock";
        self
    }

    pub fn detail_path(&self) -> String {
        format!("/catalogue/{}/index.html", self.slug)
    }

    pub fn upc(&self) -> String {
        format!("upc-{}", self.slug)
    }
}

#[derive(Debug, Clone)]
pub struct FixtureCategory {
    pub name: String,
    pub slug: String,
    pub pages: Vec<Vec<FixtureBook>>,
}

impl FixtureCategory {
    pub fn new(name: &str, slug: &str, pages: Vec<Vec<FixtureBook>>) -> Self {
        Self {
            name: name.to_string(),
            slug: slug.to_string(),
            pages,
        }
    }

    pub fn page_path(&self, number: usize) -> String {
        let file = if number == 1 {
            "index.html".to_string()
        } else {
            format!("page-{}.html", number)
        };
        format!("/catalogue/category/books/{}/{}", self.slug, file)
    }

    pub fn book_count(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }
}

/// Which parts of the site answer, and how often they must be requested
#[derive(Debug, Clone, Default)]
pub struct SiteOptions {
    /// Check that every page is requested exactly as often as it is linked
    pub verify_counts: bool,
    /// Categories whose first listing page answers 500
    pub broken_categories: Vec<String>,
    /// Books whose detail page answers 404
    pub missing_details: Vec<String>,
}

pub fn index_html(categories: &[FixtureCategory]) -> String {
    let items: String = categories
        .iter()
        .map(|c| {
            format!(
                r#"<li><a href="catalogue/category/books/{}/index.html">
                        {}
                    </a></li>"#,
                c.slug, c.name
            )
        })
        .collect();

    format!(
        r#"<html><body><div class="side_categories"><ul class="nav nav-list"><li>
             <a href="catalogue/category/books_1/index.html">Books</a>
             <ul>{}</ul>
           </li></ul></div></body></html>"#,
        items
    )
}

pub fn listing_html(books: &[FixtureBook], next: Option<&str>) -> String {
    let tiles: String = books
        .iter()
        .map(|b| {
            format!(
                r#"<li><article class="product_pod">
                     <div class="image_container"><a href="../../../{slug}/index.html">
                       <img src="../../../../media/cache/{slug}.jpg" alt="{title}"></a></div>
                     <p class="star-rating {rating}"><i class="icon-star"></i></p>
                     <h3><a href="../../../{slug}/index.html" title="{title}">{title}</a></h3>
                     <div class="product_price"><p class="price_color">{price}</p></div>
                   </article></li>"#,
                slug = b.slug,
                title = b.title,
                rating = b.rating,
                price = b.price,
            )
        })
        .collect();

    let pager = next
        .map(|href| format!(r#"<ul class="pager"><li class="next"><a href="{}">next</a></li></ul>"#, href))
        .unwrap_or_default();

    format!(
        r#"<html><body><section><ol class="row">{}</ol>{}</section></body></html>"#,
        tiles, pager
    )
}

pub fn detail_html(book: &FixtureBook) -> String {
    format!(
        r#"<html><body><article class="product_page">
             <div id="product_description" class="sub-header"><h2>Product Description</h2></div>
             <p>All about {title}.</p>
             <table class="table table-striped">
               <tr><th>UPC</th><td>{upc}</td></tr>
               <tr><th>Product Type</th><td>Books</td></tr>
               <tr><th>Availability</th><td>{availability}</td></tr>
             </table>
           </article></body></html>"#,
        title = book.title,
        upc = book.upc(),
        availability = book.availability,
    )
}

/// Mounts the index, every listing page and every detail page
pub async fn mount_site(server: &MockServer, categories: &[FixtureCategory], options: &SiteOptions) {
    mount(server, "/", 200, index_html(categories), options.verify_counts.then_some(1)).await;

    let mut detail_listings: HashMap<String, (FixtureBook, u64)> = HashMap::new();

    for category in categories {
        if options.broken_categories.contains(&category.name) {
            mount(server, &category.page_path(1), 500, String::new(), None).await;
            continue;
        }

        for (index, books) in category.pages.iter().enumerate() {
            let number = index + 1;
            let next = (number < category.pages.len()).then(|| format!("page-{}.html", number + 1));
            mount(
                server,
                &category.page_path(number),
                200,
                listing_html(books, next.as_deref()),
                options.verify_counts.then_some(1),
            )
            .await;

            for book in books {
                detail_listings
                    .entry(book.slug.clone())
                    .or_insert_with(|| (book.clone(), 0))
                    .1 += 1;
            }
        }
    }

    for (book, listings) in detail_listings.into_values() {
        if options.missing_details.contains(&book.slug) {
            mount(server, &book.detail_path(), 404, String::new(), None).await;
        } else {
            mount(
                server,
                &book.detail_path(),
                200,
                detail_html(&book),
                options.verify_counts.then_some(listings),
            )
            .await;
        }
    }
}

async fn mount(server: &MockServer, route: &str, status: u16, body: String, expected: Option<u64>) {
    let mock = Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body));

    match expected {
        Some(times) => mock.expect(times).mount(server).await,
        None => mock.mount(server).await,
    }
}

/// Two categories; Travel spans three listing pages
pub fn two_category_site() -> Vec<FixtureCategory> {
    vec![
        FixtureCategory::new(
            "Travel",
            "travel_2",
            vec![
                vec![
                    FixtureBook::new("its-only-the-himalayas_981", "It's Only the Himalayas", "£45.17", "Two"),
                    FixtureBook::new("full-moon-over-noahs-ark_811", "Full Moon over Noah’s Ark", "£49.43", "Four"),
                ],
                vec![
                    FixtureBook::new("see-america_732", "See America", "£48.87", "Three").out_of_stock(),
                    FixtureBook::new("vagabonding_552", "Vagabonding", "£36.94", "Two"),
                ],
                vec![FixtureBook::new("under-the-tuscan-sun_504", "Under the Tuscan Sun", "£37.33", "Three")],
            ],
        ),
        FixtureCategory::new(
            "Mystery",
            "mystery_3",
            vec![vec![
                FixtureBook::new("sharp-objects_997", "Sharp Objects", "£47.82", "Four"),
                FixtureBook::new("in-a-dark-dark-wood_963", "In a Dark, Dark Wood", "£19.63", "One"),
            ]],
        ),
    ]
}

/// Crawl settings pointed at the mock server, writing into `dir`
pub fn test_config(server: &MockServer, dir: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.base_url = server.uri();
    config.crawler.request_delay_ms = 0;
    config.crawler.max_retries = 1;
    config.crawler.backoff_base_ms = 1;
    config.output.csv_path = dir.join("data").join("books.csv").display().to_string();
    config
}

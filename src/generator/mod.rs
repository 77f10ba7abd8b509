//! Page assembly and static site generation
//!
//! [`PageRenderer`] turns assembled pages into HTML with the built-in
//! templates. [`Generator`] walks the whole post listing and writes every page
//! to the public directory.

mod listing;
mod post_page;

pub use listing::{load_initial_page, load_more, PostListing};
pub use post_page::{
    adjacent_posts, resolve_post, AdjacentPostLink, PostPage, PostPagination, PostResolution,
    Redirect,
};

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use tera::Context;
use walkdir::WalkDir;

use crate::cms::Client;
use crate::content::richtext::as_html;
use crate::content::{PostDetail, PostSummary};
use crate::config::SiteConfig;
use crate::helpers::{full_url_for, post_path, resolve_link, DateFormatter, POST_TYPE};
use crate::i18n::I18n;
use crate::templates::{CommentsData, ListItemData, PostData, SectionData, SiteData, TemplateRenderer};
use crate::Blog;

/// Route of the page served while a post has not been generated yet
pub const FALLBACK_ROUTE: &str = "post/_fallback";

/// Renders listing and post pages with the site's labels and date formats
pub struct PageRenderer {
    renderer: TemplateRenderer,
    i18n: I18n,
    dates: DateFormatter,
    site: SiteData,
    comments: CommentsData,
    config: SiteConfig,
}

impl PageRenderer {
    pub fn new(blog: &Blog) -> Result<Self> {
        let config = &blog.config;

        let mut i18n = I18n::new(&config.language);
        i18n.load_languages(&blog.i18n_dir)?;

        Ok(Self {
            renderer: TemplateRenderer::new()?,
            i18n,
            dates: DateFormatter::new(config),
            site: SiteData {
                title: config.title.clone(),
                description: config.description.clone(),
                language: config.language.clone(),
                logo: config.logo.clone(),
            },
            comments: CommentsData {
                enabled: config.comments.enabled(),
                repo: config.comments.repo.clone(),
                issue_term: config.comments.issue_term.clone(),
                theme: config.comments.theme.clone(),
            },
            config: config.clone(),
        })
    }

    fn base_context(&self, path: &str, preview: bool) -> Context {
        let mut context = Context::new();
        context.insert("canonical", &full_url_for(&self.config, path));
        context.insert("site", &self.site);
        context.insert("t", &self.i18n.get_all_translations());
        context.insert("comments", &self.comments);
        context.insert("preview", &preview);
        context
    }

    /// Home page with the first listing page and its "load more" cursor
    pub fn render_index(&self, listing: &PostListing, preview: bool) -> Result<String> {
        let posts: Vec<ListItemData> = listing.results.iter().map(|p| self.list_item(p)).collect();

        let mut context = self.base_context("/", preview);
        context.insert("posts", &posts);
        context.insert("next_page", &listing.next_page);

        self.renderer.render("index.html", &context)
    }

    pub fn render_post(&self, page: &PostPage) -> Result<String> {
        let path = page
            .post
            .uid
            .as_deref()
            .map(post_path)
            .unwrap_or_else(|| "/".to_string());
        let mut context = self.base_context(&path, page.preview);
        context.insert("post", &self.post_data(&page.post, page.reading_time));
        context.insert("pagination", &page.pagination);

        self.renderer.render("post.html", &context)
    }

    /// Post page in its loading state: every field shows its placeholder
    pub fn render_loading(&self) -> Result<String> {
        let loading = self.i18n.get("post.loading");
        let post = PostData {
            page_title: loading.clone(),
            title: loading,
            subtitle: String::new(),
            banner_url: self.config.default_banner.clone(),
            banner_alt: self.i18n.get("post.title"),
            author: self.i18n.get("post.author"),
            date: self.i18n.get("post.date"),
            reading_time: self.i18n.get("post.reading_time_unavailable"),
            edited: None,
            sections: Vec::new(),
            loading: true,
        };

        let mut context = self.base_context(FALLBACK_ROUTE, false);
        context.insert("post", &post);
        context.insert("pagination", &Option::<PostPagination>::None);

        self.renderer.render("post.html", &context)
    }

    fn list_item(&self, post: &PostSummary) -> ListItemData {
        ListItemData {
            href: resolve_link(POST_TYPE, post.uid.as_deref()),
            title: post
                .data
                .title
                .clone()
                .unwrap_or_else(|| self.i18n.get("post.title")),
            subtitle: post.data.subtitle.clone().unwrap_or_default(),
            author: post
                .data
                .author
                .clone()
                .unwrap_or_else(|| self.i18n.get("post.author")),
            date: post
                .first_publication_date
                .map(|d| self.dates.date(&d))
                .unwrap_or_else(|| self.i18n.get("post.date")),
        }
    }

    fn post_data(&self, post: &PostDetail, reading_time: Option<u32>) -> PostData {
        let data = &post.data;
        let title = data.title.clone();

        PostData {
            page_title: title.clone().unwrap_or_else(|| self.site.title.clone()),
            title: title.unwrap_or_else(|| self.i18n.get("post.title")),
            subtitle: data.subtitle.clone().unwrap_or_default(),
            banner_url: data
                .banner
                .as_ref()
                .map(|b| b.url.clone())
                .unwrap_or_else(|| self.config.default_banner.clone()),
            banner_alt: data
                .title
                .clone()
                .unwrap_or_else(|| self.i18n.get("post.title")),
            author: data
                .author
                .clone()
                .unwrap_or_else(|| self.i18n.get("post.author")),
            date: post
                .first_publication_date
                .map(|d| self.dates.date(&d))
                .unwrap_or_else(|| self.i18n.get("post.date")),
            reading_time: match reading_time {
                Some(minutes) => self.i18n.get_count("post.reading_time", minutes),
                None => self.i18n.get("post.reading_time_unavailable"),
            },
            edited: post
                .last_publication_date
                .map(|d| self.i18n.get_with("post.edited_at", &self.dates.edited(&d))),
            sections: data
                .content
                .iter()
                .flatten()
                .map(|group| SectionData {
                    heading: group.heading.clone(),
                    html: as_html(&group.body),
                })
                .collect(),
            loading: false,
        }
    }
}

/// Counts reported after a static build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateStats {
    pub posts: usize,
    pub assets: usize,
}

/// Static site generator
pub struct Generator {
    blog: Blog,
    pages: PageRenderer,
}

impl Generator {
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            pages: PageRenderer::new(blog)?,
        })
    }

    /// Generate the entire site from the published content
    pub async fn generate(&self, client: &Client) -> Result<GenerateStats> {
        fs::create_dir_all(&self.blog.public_dir)?;

        let page_size = self.blog.config.cms.page_size;
        let listing = load_initial_page(client, page_size).await?;
        self.write_page("", &self.pages.render_index(&listing, false)?)?;
        tracing::info!("Generated: index.html");

        let mut posts = 0;
        for uid in all_post_uids(client, listing).await? {
            match resolve_post(client, &uid).await? {
                PostResolution::Found(page) => {
                    let route = format!("post/{}", uid);
                    self.write_page(&route, &self.pages.render_post(&page)?)?;
                    tracing::debug!("Generated: {}", route);
                    posts += 1;
                }
                PostResolution::Redirect(_) => {
                    tracing::warn!("Post {:?} disappeared during generation, skipping", uid);
                }
            }
        }
        tracing::info!("Generated {} post pages", posts);

        self.write_page(FALLBACK_ROUTE, &self.pages.render_loading()?)?;

        let assets = self.copy_static_assets()?;

        Ok(GenerateStats { posts, assets })
    }

    /// Write `html` as `<public>/<route>/index.html`
    fn write_page(&self, route: &str, html: &str) -> Result<PathBuf> {
        let dir = self.blog.public_dir.join(route.trim_matches('/'));
        fs::create_dir_all(&dir)?;
        let path = dir.join("index.html");
        fs::write(&path, html)?;
        Ok(path)
    }

    /// Copy static assets (logo, banner, ...) to the public directory
    fn copy_static_assets(&self) -> Result<usize> {
        let static_dir = &self.blog.static_dir;
        if !static_dir.exists() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = self.blog.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
            copied += 1;
        }

        tracing::debug!("Copied {} static assets", copied);
        Ok(copied)
    }
}

/// Follow the listing to its end and collect every post uid
async fn all_post_uids(client: &Client, mut listing: PostListing) -> Result<Vec<String>> {
    while listing.has_more() {
        load_more(client, &mut listing).await?;
    }

    Ok(listing
        .results
        .into_iter()
        .filter_map(|post| post.uid)
        .filter(|uid| !uid.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::fixtures::tests::post;
    use crate::cms::{Document, FixtureApi};
    use chrono::Duration;
    use std::sync::Arc;

    fn blog(dir: &std::path::Path) -> Blog {
        let mut blog = Blog::new(dir).unwrap();
        blog.config.language = "en".to_string();
        blog.config.timezone = "UTC".to_string();
        blog.config.cms.page_size = 2;
        blog
    }

    fn client(documents: Vec<Document>) -> Client {
        Client::new(Arc::new(FixtureApi::from_documents(documents)))
    }

    async fn page(client: &Client, slug: &str) -> PostPage {
        match resolve_post(client, slug).await.unwrap() {
            PostResolution::Found(page) => *page,
            PostResolution::Redirect(_) => panic!("post {} not found", slug),
        }
    }

    #[tokio::test]
    async fn test_render_post() {
        let dir = tempfile::tempdir().unwrap();
        let pages = PageRenderer::new(&blog(dir.path())).unwrap();
        let mut doc = post("A", "a", 15);
        doc.last_publication_date = doc.first_publication_date.map(|d| d + Duration::days(10));
        let client = client(vec![doc, post("B", "b", 16)]);

        let html = pages.render_post(&page(&client, "a").await).unwrap();
        assert!(html.contains("<title>Post a</title>"));
        assert!(html.contains("15 Mar 2021"));
        assert!(html.contains("1 min"));
        assert!(html.contains("* edited at 25 Mar 2021"));
        assert!(html.contains("<p>foo bar baz</p>"));
        assert!(html.contains("Next post"));
        assert!(!html.contains("Previous post"));
    }

    #[tokio::test]
    async fn test_render_post_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let pages = PageRenderer::new(&blog(dir.path())).unwrap();
        let mut doc = post("A", "a", 1);
        doc.data = serde_json::json!({});
        doc.first_publication_date = None;
        doc.last_publication_date = None;

        let html = pages.render_post(&page(&client(vec![doc]), "a").await).unwrap();
        assert!(html.contains("Reading time unavailable"));
        assert!(html.contains("Publication date"));
        assert!(html.contains("banner.png"));
        assert!(!html.contains("edited at"));
    }

    #[test]
    fn test_render_loading() {
        let dir = tempfile::tempdir().unwrap();
        let pages = PageRenderer::new(&blog(dir.path())).unwrap();
        let html = pages.render_loading().unwrap();
        assert!(html.contains("Loading..."));
        assert!(!html.contains("utteranc.es"));
    }

    #[tokio::test]
    async fn test_generate_writes_every_post() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("static/images")).unwrap();
        fs::write(dir.path().join("static/logo.svg"), "<svg/>").unwrap();
        fs::write(dir.path().join("static/images/banner.png"), "png").unwrap();

        let blog = blog(dir.path());
        let client = client(vec![
            post("A", "a", 1),
            post("B", "b", 2),
            post("C", "c", 3),
            post("D", "d", 4),
            post("E", "e", 5),
        ]);

        let stats = Generator::new(&blog)
            .unwrap()
            .generate(&client)
            .await
            .unwrap();
        assert_eq!(stats, GenerateStats { posts: 5, assets: 2 });

        let public = dir.path().join("public");
        let index = fs::read_to_string(public.join("index.html")).unwrap();
        assert!(index.contains("Post e"));
        assert!(index.contains("Post d"));
        assert!(!index.contains("Post c"));
        assert!(index.contains(r#"id="load-more""#));

        for uid in ["a", "b", "c", "d", "e"] {
            assert!(public.join("post").join(uid).join("index.html").exists());
        }
        assert!(public.join("post/_fallback/index.html").exists());
        assert!(public.join("logo.svg").exists());
        assert!(public.join("images/banner.png").exists());
    }
}

use anyhow::Result;
use marketplace_page::adapters::http::RequestPolicy;
use marketplace_page::core::page::{CATEGORY_FILTER_ID, MIN_RATE_FILTER_ID, REQUIRED_FIELDS_MESSAGE};
use marketplace_page::core::template::{FieldTemplate, FormTemplate, JobCardRecord};
use marketplace_page::domain::document::Display;
use marketplace_page::domain::model::LatLng;
use marketplace_page::{EventOutcome, HttpMarketplaceApi, Page, PageEvent, PageTemplate};
use std::io::Write;
use std::time::Duration;
use tempfile::Builder;

type TestPage = Page<HttpMarketplaceApi>;

/// 這些測試不會打到後端
fn offline_api() -> HttpMarketplaceApi {
    HttpMarketplaceApi::new(
        "http://127.0.0.1:1/api/messages".to_string(),
        "http://127.0.0.1:1/api/availability".to_string(),
        RequestPolicy::default(),
    )
}

fn card(title: &str, category: &str, rate: &str, lat: &str, lng: &str) -> JobCardRecord {
    JobCardRecord {
        title: title.to_string(),
        category: category.to_string(),
        rate: rate.to_string(),
        lat: lat.to_string(),
        lng: lng.to_string(),
        ..Default::default()
    }
}

fn ready_page(template: PageTemplate) -> Result<TestPage> {
    let mut page: TestPage = Page::new(template.build()?, offline_api());
    page.on_ready()?;
    Ok(page)
}

fn visible_titles(page: &TestPage) -> Vec<String> {
    let doc = page.document();
    doc.query_class("job-card")
        .into_iter()
        .filter_map(|n| doc.element(n).ok())
        .filter(|el| el.display() != Some(Display::None))
        .map(|el| el.text().to_string())
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_blocked_submit_notification_expires() -> Result<()> {
    let template = PageTemplate::marketplace().with_form(FormTemplate {
        id: "job-form".to_string(),
        fields: vec![
            FieldTemplate::required("input", "title", ""),
            FieldTemplate::optional("textarea", "notes", ""),
        ],
    });
    let mut page = ready_page(template)?;
    let form = page.document().require_by_id("job-form")?;

    let outcome = page.dispatch(PageEvent::Submit(form)).await?;
    assert_eq!(outcome, EventOutcome::Blocked);
    assert_eq!(page.document().query_class("invalid").len(), 1);

    let banners = page.document().query_class("notification");
    assert_eq!(banners.len(), 1);
    let banner = page.document().element(banners[0])?;
    assert!(banner.has_class("error"));
    assert_eq!(banner.text(), REQUIRED_FIELDS_MESSAGE);

    tokio::time::advance(Duration::from_millis(2999)).await;
    assert_eq!(page.run_due_timers()?, 0);
    assert_eq!(page.document().query_class("notification").len(), 1);

    tokio::time::advance(Duration::from_millis(1)).await;
    assert_eq!(page.run_due_timers()?, 1);
    assert!(page.document().query_class("notification").is_empty());
    assert!(page.next_timer_deadline().is_none());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_valid_submit_is_handled_and_clears_marks() -> Result<()> {
    let template = PageTemplate::marketplace().with_form(FormTemplate {
        id: "job-form".to_string(),
        fields: vec![FieldTemplate::required("input", "title", "Fix sink")],
    });
    let mut page = ready_page(template)?;
    let form = page.document().require_by_id("job-form")?;

    assert_eq!(
        page.dispatch(PageEvent::Submit(form)).await?,
        EventOutcome::Handled
    );
    assert!(page.document().query_class("notification").is_empty());
    assert_eq!(page.wait_for_next_timer().await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_filter_change_event_hides_cards() -> Result<()> {
    let template = PageTemplate::marketplace().with_job_cards(vec![
        card("Fix sink", "Plumbing", "30", "", ""),
        card("Rewire lamp", "Electrical", "45", "", ""),
        card("Unclog drain", "Plumbing", "20", "", ""),
    ]);
    let mut page = ready_page(template)?;

    let category = page.document().require_by_id(CATEGORY_FILTER_ID)?;
    page.document_mut()
        .element_mut(category)?
        .set_value("Plumbing");
    assert_eq!(
        page.dispatch(PageEvent::Change(category)).await?,
        EventOutcome::Handled
    );
    assert_eq!(visible_titles(&page), vec!["Fix sink", "Unclog drain"]);

    let min_rate = page.document().require_by_id(MIN_RATE_FILTER_ID)?;
    page.document_mut().element_mut(min_rate)?.set_value("25");
    page.dispatch(PageEvent::Change(min_rate)).await?;
    assert_eq!(visible_titles(&page), vec!["Fix sink"]);

    page.document_mut().element_mut(category)?.set_value("");
    page.document_mut().element_mut(min_rate)?.set_value("");
    page.dispatch(PageEvent::Change(min_rate)).await?;
    assert_eq!(visible_titles(&page).len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_file_change_event_fills_preview() -> Result<()> {
    let mut page = ready_page(PageTemplate::marketplace())?;

    let mut image = Builder::new().suffix(".png").tempfile()?;
    image.write_all(b"abc")?;

    let input = page
        .document()
        .query_tag("input")
        .into_iter()
        .find(|n| {
            page.document()
                .element(*n)
                .map(|el| el.attribute("type") == Some("file"))
                .unwrap_or(false)
        })
        .expect("profile form has a file input");
    page.document_mut()
        .element_mut(input)?
        .set_files(vec![image.path().to_path_buf()]);

    page.dispatch(PageEvent::Change(input)).await?;

    let preview = page.document().require_by_id("image-preview")?;
    assert_eq!(
        page.document().element(preview)?.attribute("src"),
        Some("data:image/png;base64,YWJj")
    );
    Ok(())
}

#[tokio::test]
async fn test_remove_button_click_detaches_row() -> Result<()> {
    let mut page = ready_page(PageTemplate::marketplace())?;

    let first = page.add_service_field()?;
    let second = page.add_service_field()?;
    assert_eq!((first.index, second.index), (0, 1));

    assert_eq!(
        page.dispatch(PageEvent::Click(first.remove_button)).await?,
        EventOutcome::Handled
    );
    assert!(!page.document().is_connected(first.row));
    assert!(page.document().is_connected(second.row));

    // 已移除的按鈕不再有 listener
    assert_eq!(
        page.dispatch(PageEvent::Click(first.remove_button)).await?,
        EventOutcome::Ignored
    );

    let third = page.add_service_field()?;
    assert_eq!(third.index, 2);
    let select = page.document().element(third.select)?;
    assert_eq!(select.attribute("name"), Some("service-2"));
    Ok(())
}

#[tokio::test]
async fn test_ready_page_plots_visible_jobs() -> Result<()> {
    let template = PageTemplate::marketplace().with_job_cards(vec![
        card("Fix sink", "Plumbing", "30", "40.7306", "-73.9352"),
        card("Rewire lamp", "Electrical", "45", "40.6782", "-73.9442"),
        card("No coordinates", "Painting", "25", "", ""),
    ]);
    let mut page = ready_page(template)?;
    assert!(page.map().is_initialized());

    let origin = LatLng::new(40.7128, -74.0060);
    let plotted = page.plot_jobs(Some(origin), Some(10.0))?;

    assert_eq!(plotted, 2);
    // 兩個工作加上使用者位置
    assert_eq!(page.map().markers().len(), 3);
    assert_eq!(page.map().service_areas().len(), 1);
    let surface = page.map().surface().expect("map initialized");
    assert_eq!(surface.circle_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_star_click_sets_rating() -> Result<()> {
    let mut page = ready_page(PageTemplate::marketplace().with_star_count(5))?;
    let stars = page.document().query_class("star");

    assert_eq!(
        page.dispatch(PageEvent::Click(stars[2])).await?,
        EventOutcome::Handled
    );

    let doc = page.document();
    let value = doc.require_by_id("rating-value")?;
    assert_eq!(doc.element(value)?.value(), "3");
    let active: Vec<bool> = stars
        .iter()
        .map(|n| doc.element(*n).map(|el| el.has_class("active")).unwrap_or(false))
        .collect();
    assert_eq!(active, vec![true, true, true, false, false]);

    page.dispatch(PageEvent::Click(stars[0])).await?;
    let value = page.document().require_by_id("rating-value")?;
    assert_eq!(page.document().element(value)?.value(), "1");
    Ok(())
}

/// 沒有關鍵字欄位時，其他篩選條件照常運作
#[tokio::test]
async fn test_filter_without_keyword_field() -> Result<()> {
    let template = PageTemplate::marketplace()
        .without_keyword_filter()
        .with_job_cards(vec![
            card("Fix sink", "Plumbing", "30", "", ""),
            card("Rewire lamp", "Electrical", "45", "", ""),
        ]);
    let mut page = ready_page(template)?;
    assert!(page.document().get_element_by_id("keyword-filter").is_none());

    let min_rate = page.document().require_by_id(MIN_RATE_FILTER_ID)?;
    page.document_mut().element_mut(min_rate)?.set_value("40");
    assert_eq!(
        page.dispatch(PageEvent::Change(min_rate)).await?,
        EventOutcome::Handled
    );

    assert_eq!(page.current_filter()?.keyword, None);
    assert_eq!(visible_titles(&page), vec!["Rewire lamp"]);
    Ok(())
}

#[tokio::test]
async fn test_page_without_map_mount_skips_map() -> Result<()> {
    let template = PageTemplate::marketplace()
        .without_map()
        .with_job_cards(vec![card("Fix sink", "Plumbing", "30", "40.73", "-73.93")]);
    let page = ready_page(template)?;

    assert!(!page.map().is_initialized());
    assert!(page.map().markers().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_removing_row_drops_all_its_listeners() -> Result<()> {
    let mut page = ready_page(PageTemplate::marketplace())?;
    let row = page.add_service_field()?;
    assert!(page.has_listener(PageEvent::Click(row.remove_button)));

    // 從 select 移除整列，按鈕的 listener 也要一起清掉
    page.remove_service_field(row.select)?;

    assert!(!page.document().is_connected(row.row));
    assert!(!page.has_listener(PageEvent::Click(row.remove_button)));
    assert_eq!(
        page.dispatch(PageEvent::Click(row.remove_button)).await?,
        EventOutcome::Ignored
    );
    Ok(())
}

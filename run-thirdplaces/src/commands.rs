//! Command handlers
//!
//! Recoverable failures (a rolled-back like, a failed refresh in watch mode)
//! are shown as alerts and the command still succeeds. Anything else is
//! returned to `main`.

use std::sync::Arc;
use std::time::Duration;
use thirdplaces_adaptor_terminal::spawn_line_reader;
use thirdplaces_core::{
    visible_places, Category, CategoryFilter, DebouncedSearch, FetchOrder, LikeSnapshot,
    MutationOutcome, NewPlace, PlaceCandidate, PlaceFeed, PlaceId, PlaceSubmission,
    PlaceSubmitter, RankedResult, Result, SavedPlaces, SavedPlacesController, SearchResultsView,
    SearchUpdate, ThirdPlacesError, UserAlert,
};
use tracing::{debug, info};

use crate::app::App;

/// Feed refresh period in watch mode
pub const WATCH_INTERVAL: Duration = Duration::from_secs(30);

/// How long to wait for the last pending search once input has ended
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// One-shot semantic search
pub async fn search(app: &App, query: &str) -> Result<Vec<RankedResult>> {
    let engine = app.engine()?;
    if !engine.is_searchable(query) {
        app.terminal.info(&format!(
            "Type at least {} characters to search",
            engine.config().min_query_chars
        ));
        return Ok(Vec::new());
    }

    let results = engine.search(query).await?;
    app.terminal.show_results(query, &results);
    Ok(results)
}

fn show_update(
    app: &App,
    feed: &PlaceFeed,
    view: &mut SearchResultsView,
    update: SearchUpdate,
) {
    if !view.apply(update) {
        return;
    }
    if let Some(alert) = view.take_alert() {
        app.terminal.show_alert(&alert);
        return;
    }

    match view.query() {
        Some(query) if query.trim().chars().count() >= app.search.min_query_chars => {
            app.terminal.show_results(query, view.results());
        }
        _ => {
            let places = visible_places(feed.places(), CategoryFilter::All, view.results());
            app.terminal.show_places(&places, |id| feed.is_liked(id));
        }
    }
}

/// Search as you type: every stdin line replaces the query text
pub async fn interactive(app: &App) -> Result<()> {
    let engine = app.engine()?;
    let delay = engine.config().debounce;
    let (debouncer, mut updates) = DebouncedSearch::new(engine);

    let mut feed = PlaceFeed::new(Arc::clone(&app.store));
    if let Some(alert) = feed.refresh().await {
        app.terminal.show_alert(&alert);
    }
    let mut view = SearchResultsView::new();

    let (reader, mut lines) = spawn_line_reader();
    app.terminal
        .info("Type to search. An empty line clears the results, Ctrl-D quits.");

    let mut pending = false;
    let mut latest = 0;
    loop {
        tokio::select! {
            line = lines.recv() => match line {
                Some(line) => {
                    pending = !line.trim().is_empty();
                    latest = debouncer.submit(line);
                    debug!("Submitted query #{}", latest);
                }
                None => break,
            },
            Some(update) = updates.recv() => {
                if update.token() == latest {
                    pending = false;
                }
                show_update(app, &feed, &mut view, update);
            }
        }
    }

    let deadline = tokio::time::Instant::now() + delay + DRAIN_TIMEOUT;
    while pending {
        match tokio::time::timeout_at(deadline, updates.recv()).await {
            Ok(Some(update)) => {
                pending = update.token() != latest;
                show_update(app, &feed, &mut view, update);
            }
            _ => break,
        }
    }

    reader.abort();
    Ok(())
}

/// Print the feed, optionally refreshing it every [`WATCH_INTERVAL`]
///
/// Auto-refresh only runs while every category is shown.
pub async fn list(app: &App, category: Option<Category>, watch: bool) -> Result<()> {
    let filter = CategoryFilter::All.select(category);
    let mut feed = PlaceFeed::load(Arc::clone(&app.store)).await?;
    show_feed(app, &feed, filter);

    if !watch {
        return Ok(());
    }
    if filter != CategoryFilter::All {
        app.terminal
            .info("Auto-refresh only runs when every category is shown");
        return Ok(());
    }

    let mut ticker = tokio::time::interval(WATCH_INTERVAL);
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match feed.refresh().await {
                    Some(alert) => app.terminal.show_alert(&alert),
                    None => show_feed(app, &feed, filter),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping feed watch");
                break;
            }
        }
    }
    Ok(())
}

fn show_feed(app: &App, feed: &PlaceFeed, filter: CategoryFilter) {
    let places = visible_places(feed.places(), filter, &[]);
    app.terminal.show_places(&places, |id| feed.is_liked(id));
}

fn report<T>(app: &App, outcome: &MutationOutcome<T>, done: &str) {
    match &outcome.alert {
        Some(alert) => app.terminal.show_alert(alert),
        None => app.terminal.info(done),
    }
}

/// Like a place
pub async fn like(app: &App, id: PlaceId) -> Result<MutationOutcome<LikeSnapshot>> {
    let mut feed = PlaceFeed::load(Arc::clone(&app.store)).await?;
    let outcome = feed.toggle_like(id).await?;
    report(
        app,
        &outcome,
        &format!("Liked #{} ({} likes)", id, outcome.mutation.proposed().likes),
    );
    Ok(outcome)
}

async fn saved_controller(app: &App) -> Result<(SavedPlacesController, Vec<PlaceId>)> {
    let places = app.store.fetch_places(FetchOrder::Natural).await?;
    let ids = places.iter().map(|p| p.id).collect();
    let controller =
        SavedPlacesController::new(SavedPlaces::from_records(places), Arc::clone(&app.store));
    Ok((controller, ids))
}

/// Print saved places
pub async fn saved(app: &App) -> Result<SavedPlaces> {
    let (controller, _) = saved_controller(app).await?;
    app.terminal.show_saved(controller.state());
    Ok(controller.state().clone())
}

/// Save a place, or unsave it if it is already saved
pub async fn bookmark(app: &App, id: PlaceId) -> Result<MutationOutcome<bool>> {
    let places = app.store.fetch_places(FetchOrder::Natural).await?;
    let place = places
        .iter()
        .find(|p| p.id == id)
        .cloned()
        .ok_or_else(|| ThirdPlacesError::not_found(format!("place {} does not exist", id)))?;

    let mut controller =
        SavedPlacesController::new(SavedPlaces::from_records(places), Arc::clone(&app.store));
    let outcome = controller.toggle_bookmark(&place).await;
    let done = if *outcome.mutation.proposed() {
        format!("Saved {}", place.name)
    } else {
        format!("Removed {} from saved places", place.name)
    };
    report(app, &outcome, &done);
    Ok(outcome)
}

/// Set the note on a saved place; blank text clears it
pub async fn note(app: &App, id: PlaceId, text: &str) -> Result<MutationOutcome<Option<String>>> {
    let (mut controller, ids) = saved_controller(app).await?;
    if !ids.contains(&id) {
        return Err(ThirdPlacesError::not_found(format!("place {} does not exist", id)));
    }

    let outcome = controller.save_note(id, Some(text.to_string())).await?;
    let done = match outcome.mutation.proposed() {
        Some(_) => format!("Note saved for #{}", id),
        None => format!("Note cleared for #{}", id),
    };
    report(app, &outcome, &done);
    Ok(outcome)
}

/// Print third-party lookup hits
pub async fn lookup(app: &App, query: &str) -> Result<Vec<PlaceCandidate>> {
    let candidates = app.lookup()?.text_search(query).await?;
    app.terminal.show_candidates(&candidates);
    Ok(candidates)
}

/// Look up `query`, take hit number `pick` (from 1) and add it as a place
pub async fn submit(
    app: &App,
    query: &str,
    pick: usize,
    category: Category,
    description: Option<String>,
) -> Result<NewPlace> {
    let candidates = app.lookup()?.text_search(query).await?;
    if candidates.is_empty() {
        return Err(ThirdPlacesError::validation(format!(
            "No places found for \"{}\"",
            query.trim()
        )));
    }
    let candidate = pick
        .checked_sub(1)
        .and_then(|i| candidates.get(i))
        .cloned()
        .ok_or_else(|| {
            ThirdPlacesError::validation(format!(
                "--pick must be between 1 and {}",
                candidates.len()
            ))
        })?;

    let submission = PlaceSubmission {
        candidate: Some(candidate),
        category: Some(category),
        description: description.unwrap_or_default(),
    };

    let mut submitter = PlaceSubmitter::new(Arc::clone(&app.store));
    if let Some(embedder) = &app.embedder {
        submitter = submitter.with_embedder(Arc::clone(embedder));
    }
    let place = submitter.submit(submission).await?;
    app.terminal
        .info(&format!("Added {} ({})", place.name, place.category));
    Ok(place)
}

/// Alert shown for a command that failed outright
pub fn failure_alert(error: &ThirdPlacesError) -> UserAlert {
    UserAlert::from_error(None, error)
}

use crate::clients::jikan::MalAnime;
use crate::state::SharedState;

pub(super) fn print_result_line(prefix: &str, anime: &MalAnime) {
    let eps = anime
        .episodes
        .map_or_else(|| "? eps".to_string(), |e| format!("{e} eps"));
    let title = anime.title.as_deref().unwrap_or("?");
    let title_en = anime.title_english.as_deref().unwrap_or("");

    println!("{prefix} {title} ({eps})");
    if !title_en.is_empty() && title_en != title {
        println!("    EN: {title_en}");
    }
    println!(
        "    Type: {} | Score: {} | MAL ID: {}",
        anime.anime_type.as_deref().unwrap_or("?"),
        anime
            .score
            .map_or_else(|| "-".to_string(), |s| format!("{s:.2}")),
        anime.mal_id
    );
}

pub async fn cmd_search_anime(state: &SharedState, query: &str) -> anyhow::Result<()> {
    println!("Searching for: {query}");

    let results = state.jikan.search(query).await?;

    if results.is_empty() {
        println!("No anime found matching '{query}'");
        return Ok(());
    }

    println!();
    println!("Search Results:");
    println!("{:-<60}", "");

    for anime in results.iter().take(10) {
        print_result_line("•", anime);
        println!();
    }

    println!("To add an anime: animelog add \"{query}\"");

    Ok(())
}

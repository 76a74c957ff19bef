//! Yes/no confirmation with message buttons.

use crate::{bot::Context, errors::Result};
use poise::serenity_prelude as serenity;
use std::time::Duration;
use tracing::debug;

const CONFIRM_TIMEOUT: Duration = Duration::from_secs(60);

/// Asks the invoking user to confirm a destructive action.
///
/// Returns `true` only if the user presses the confirm button before the prompt
/// times out. The buttons are removed once the prompt is answered or expires.
pub async fn confirm(ctx: Context<'_>, question: &str, confirm_label: &str) -> Result<bool> {
    let ctx_id = ctx.id();
    let confirm_id = format!("{ctx_id}-confirm");
    let cancel_id = format!("{ctx_id}-cancel");

    let buttons = serenity::CreateActionRow::Buttons(vec![
        serenity::CreateButton::new(&confirm_id)
            .label(confirm_label)
            .style(serenity::ButtonStyle::Danger),
        serenity::CreateButton::new(&cancel_id)
            .label("Cancel")
            .style(serenity::ButtonStyle::Secondary),
    ]);
    let reply = ctx
        .send(
            poise::CreateReply::default()
                .content(question)
                .components(vec![buttons])
                .ephemeral(true),
        )
        .await?;

    let prefix = ctx_id.to_string();
    let press = serenity::ComponentInteractionCollector::new(ctx.serenity_context().shard.clone())
        .author_id(ctx.author().id)
        .channel_id(ctx.channel_id())
        .timeout(CONFIRM_TIMEOUT)
        .filter(move |press| press.data.custom_id.starts_with(&prefix))
        .await;

    let confirmed = match press {
        Some(press) => {
            press
                .create_response(
                    ctx.serenity_context(),
                    serenity::CreateInteractionResponse::Acknowledge,
                )
                .await?;
            press.data.custom_id == confirm_id
        }
        None => {
            debug!("Confirmation prompt timed out");
            false
        }
    };

    let outcome = if confirmed { "Confirmed." } else { "Cancelled." };
    reply
        .edit(
            ctx,
            poise::CreateReply::default()
                .content(format!("{question}\n{outcome}"))
                .components(Vec::new()),
        )
        .await?;

    Ok(confirmed)
}

use protocol::{
    chat::Message,
    info::{ServerInfo, ServerPlayerInfo, VersionInfo},
};

use crate::{context::Context, font::FontWidths};

/// Joins the two MOTD lines and centers each one whose flag is set.
pub fn status_description(
    line_1: &str,
    line_2: &str,
    centered: [bool; 2],
    widths: &FontWidths,
) -> String {
    let motd = format!("{}\n{}", line_1, line_2);

    motd.split('\n')
        .enumerate()
        .map(|(index, line)| match centered.get(index) {
            Some(true) => widths.center(line),
            _ => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Status response advertising an empty server with the configured MOTD.
pub fn status_response(context: &Context) -> ServerInfo {
    let motd = &context.config.server.messages.motd;
    let minecraft = &context.config.minecraft;

    ServerInfo::new(
        VersionInfo {
            name: minecraft.version.clone(),
            protocol: minecraft.protocol_version,
        },
        ServerPlayerInfo::empty(),
        Message::new(status_description(
            &motd.line_1,
            &motd.line_2,
            motd.centered(),
            &context.font_widths,
        )),
    )
}

pub fn kick_message(context: &Context) -> Message {
    Message::new(context.config.server.messages.kick_message.clone())
}

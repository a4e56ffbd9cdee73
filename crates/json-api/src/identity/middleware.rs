//! Identity middleware.

use fulfilment_app::identity::{Actor, Role, UserUuid};
use salvo::prelude::*;

use crate::{
    extensions::*,
    identity::{USER_ROLE_HEADER, USER_UUID_HEADER},
};

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let actor = match actor_from_headers(req) {
        Ok(actor) => actor,
        Err(brief) => {
            res.render(StatusError::unauthorized().brief(brief));
            ctrl.skip_rest();

            return;
        }
    };

    tracing::Span::current().record("user_uuid", tracing::field::display(actor.user));

    depot.insert_actor(actor);

    ctrl.call_next(req, depot, res).await;
}

fn actor_from_headers(req: &Request) -> Result<Actor, &'static str> {
    let user = header_str(req, USER_UUID_HEADER)
        .ok_or("Missing x-user-uuid header")?
        .parse::<UserUuid>()
        .map_err(|_ignored| "Invalid x-user-uuid header")?;

    let role = match header_str(req, USER_ROLE_HEADER) {
        Some(role) => role
            .parse::<Role>()
            .map_err(|_ignored| "Invalid x-user-role header")?,
        None => Role::User,
    };

    Ok(Actor::new(user, role))
}

fn header_str<'a>(req: &'a Request, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)?
        .to_str()
        .ok()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

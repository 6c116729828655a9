//! Admin registrations for this deployment: the built-in auth app plus the
//! club domain apps.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::catalog::{
    AdminSite, FieldDescriptor, FieldKind, ModelRegistration, RelationDef, SqlModelSource,
};

/// Build the admin site for this deployment.
pub fn build_admin_site(pool: &SqlitePool, admin_base: &str) -> AdminSite {
    let mut site = AdminSite::new(admin_base);
    register_auth(&mut site, pool);
    register_teams(&mut site, pool);
    register_players(&mut site, pool);
    register_stadiums(&mut site, pool);
    site
}

fn register_auth(site: &mut AdminSite, pool: &SqlitePool) {
    site.register_app(
        "auth",
        "Authentication and Authorization",
        vec![
            ModelRegistration::new("User", "Users")
                .field(FieldDescriptor::new("username", FieldKind::Char).help("Unique login name"))
                .field(FieldDescriptor::new("email", FieldKind::Char))
                .field(
                    FieldDescriptor::new("is_staff", FieldKind::Boolean)
                        .help("Whether the user can sign in to this admin console"),
                )
                .field(
                    FieldDescriptor::new("is_superuser", FieldKind::Boolean)
                        .help("Grants all permissions without assigning them explicitly"),
                )
                .source(Arc::new(
                    SqlModelSource::new(pool.clone(), "User", "users")
                        .label_expr("m.username")
                        .columns(&["username", "email"]),
                )),
            ModelRegistration::new("Group", "Groups")
                .field(FieldDescriptor::new("name", FieldKind::Char).help("The name of the group"))
                .source(Arc::new(
                    SqlModelSource::new(pool.clone(), "Group", "groups").columns(&["name"]),
                )),
        ],
    );
}

fn register_teams(site: &mut AdminSite, pool: &SqlitePool) {
    site.register_app(
        "teams",
        "Teams",
        vec![
            ModelRegistration::new("Team", "Teams")
                .field(
                    FieldDescriptor::new("name", FieldKind::Char)
                        .help("The official name of the football team"),
                )
                .field(
                    FieldDescriptor::new("key", FieldKind::Slug)
                        .help("Unique key, used in URLs and code references"),
                )
                .field(FieldDescriptor::new("team_type", FieldKind::Char).help("The type of team"))
                .field(
                    FieldDescriptor::new("website", FieldKind::Url)
                        .help("Link to the official website of the team"),
                )
                .field(
                    FieldDescriptor::new("motto", FieldKind::Char)
                        .help("The official motto of the club"),
                )
                .field(
                    FieldDescriptor::new("description", FieldKind::Text)
                        .help("A description of the team and its history"),
                )
                .field(
                    FieldDescriptor::new("stadium", FieldKind::ForeignKey)
                        .help("The stadium the team currently plays in, as home"),
                )
                .field(FieldDescriptor::new("created_at", FieldKind::DateTime))
                .field(FieldDescriptor::new("updated_at", FieldKind::DateTime))
                .source(Arc::new(
                    SqlModelSource::new(pool.clone(), "Team", "teams").columns(&[
                        "name",
                        "key",
                        "team_type",
                        "website",
                        "motto",
                        "description",
                    ]),
                ))
                .search_fields(&["name", "description", "=key"]),
            ModelRegistration::new("Squad", "Squads")
                .field(
                    FieldDescriptor::new("team", FieldKind::ForeignKey)
                        .help("The team that fields this squad"),
                )
                .field(
                    FieldDescriptor::new("squad_type", FieldKind::Char).help("The type of squad"),
                )
                .field(
                    FieldDescriptor::new("players", FieldKind::ManyToMany)
                        .help("The players selected for this squad"),
                )
                .field(FieldDescriptor::new("created_at", FieldKind::DateTime))
                .field(FieldDescriptor::new("updated_at", FieldKind::DateTime))
                .source(Arc::new(
                    SqlModelSource::new(pool.clone(), "Squad", "squads")
                        .label_expr("'Squad #' || CAST(m.id AS TEXT)")
                        .columns(&["squad_type"])
                        .relation(RelationDef::many_to_one("team", "team_id", "teams", "id"))
                        .relation(RelationDef::many_to_many(
                            "players",
                            "squad_players",
                            "squad_id",
                            "player_id",
                            "players",
                            "id",
                        )),
                ))
                .search_fields(&["team.name", "players.name"]),
        ],
    );
}

fn register_players(site: &mut AdminSite, pool: &SqlitePool) {
    site.register_app(
        "players",
        "Players",
        vec![
            ModelRegistration::new("Player", "Players")
                .field(
                    FieldDescriptor::new("name", FieldKind::Char)
                        .help("The full name of the player"),
                )
                .field(
                    FieldDescriptor::new("key", FieldKind::Slug)
                        .help("Unique key, used in URLs and code references"),
                )
                .field(FieldDescriptor::new("created_at", FieldKind::DateTime))
                .field(FieldDescriptor::new("updated_at", FieldKind::DateTime))
                .source(Arc::new(
                    SqlModelSource::new(pool.clone(), "Player", "players")
                        .columns(&["name", "key"]),
                )),
            ModelRegistration::new("PlayerAttributes", "Player attributes")
                .field(
                    FieldDescriptor::new("player", FieldKind::OneToOne)
                        .help("The player these attributes belong to"),
                )
                .field(
                    FieldDescriptor::new("position", FieldKind::Char)
                        .help("The player's primary position"),
                )
                .field(
                    FieldDescriptor::new("nationality", FieldKind::Char)
                        .help("The player's sporting nationality"),
                )
                .field(
                    FieldDescriptor::new("age", FieldKind::Integer)
                        .help("The current age of the player"),
                )
                .field(
                    FieldDescriptor::new("score_defence", FieldKind::Integer)
                        .help("The player's defensive score, out of 100"),
                )
                .field(
                    FieldDescriptor::new("score_midfield", FieldKind::Integer)
                        .help("The player's midfield score, out of 100"),
                )
                .field(
                    FieldDescriptor::new("score_offence", FieldKind::Integer)
                        .help("The player's offensive score, out of 100"),
                )
                .field(FieldDescriptor::new("created_at", FieldKind::DateTime))
                .field(FieldDescriptor::new("updated_at", FieldKind::DateTime))
                .source(Arc::new(
                    SqlModelSource::new(pool.clone(), "PlayerAttributes", "player_attributes")
                        .pk_column("player_id")
                        .label_expr("'Player attributes (' || CAST(m.player_id AS TEXT) || ')'")
                        .columns(&["position", "nationality"]),
                )),
            ModelRegistration::new("PlayerContract", "Player contracts")
                .field(
                    FieldDescriptor::new("player", FieldKind::ForeignKey)
                        .help("The player signing the contract"),
                )
                .field(
                    FieldDescriptor::new("team", FieldKind::ForeignKey)
                        .help("The team signing the contract"),
                )
                .field(
                    FieldDescriptor::new("valid_from", FieldKind::Date)
                        .help("The date the contract starts"),
                )
                .field(
                    FieldDescriptor::new("duration", FieldKind::Integer)
                        .help("The length of the contract, in years"),
                )
                .field(
                    FieldDescriptor::new("terms", FieldKind::Text)
                        .help("The agreed terms of the contract"),
                )
                .field(FieldDescriptor::new("created_at", FieldKind::DateTime))
                .field(FieldDescriptor::new("updated_at", FieldKind::DateTime))
                .source(Arc::new(
                    SqlModelSource::new(pool.clone(), "PlayerContract", "player_contracts")
                        .label_expr("'Contract #' || CAST(m.id AS TEXT)")
                        .columns(&["terms"]),
                )),
        ],
    );
}

fn register_stadiums(site: &mut AdminSite, pool: &SqlitePool) {
    site.register_app(
        "stadiums",
        "Stadiums",
        vec![
            ModelRegistration::new("Stadium", "Stadiums")
                .field(
                    FieldDescriptor::new("name", FieldKind::Char)
                        .help("The name of the stadium"),
                )
                .field(
                    FieldDescriptor::new("key", FieldKind::Slug)
                        .help("Unique key, used in URLs and code references"),
                )
                .field(
                    FieldDescriptor::new("capacity", FieldKind::Integer)
                        .help("The full capacity of the stadium"),
                )
                .field(FieldDescriptor::new("created_at", FieldKind::DateTime))
                .field(FieldDescriptor::new("updated_at", FieldKind::DateTime))
                .source(Arc::new(
                    SqlModelSource::new(pool.clone(), "Stadium", "stadiums")
                        .columns(&["name", "key"]),
                )),
            ModelRegistration::new("Pitch", "Pitches")
                .field(
                    FieldDescriptor::new("stadium", FieldKind::OneToOne)
                        .help("The stadium that houses this pitch"),
                )
                .field(
                    FieldDescriptor::new("surface_type", FieldKind::Char)
                        .label("playing surface")
                        .help("The type of playing surface"),
                )
                .field(
                    FieldDescriptor::new("width", FieldKind::Integer)
                        .help("The width of the playing surface, in cm"),
                )
                .field(
                    FieldDescriptor::new("length", FieldKind::Integer)
                        .help("The length of the playing surface, in cm"),
                )
                .field(FieldDescriptor::new("created_at", FieldKind::DateTime))
                .field(FieldDescriptor::new("updated_at", FieldKind::DateTime))
                .source(Arc::new(
                    SqlModelSource::new(pool.clone(), "Pitch", "pitches")
                        .label_expr("'Pitch #' || CAST(m.id AS TEXT)")
                        .columns(&["surface_type"]),
                )),
        ],
    );
}

use anyhow::Result;
use chores_app::AppController;

pub async fn list(controller: &AppController) -> Result<()> {
    let children = controller.read(|s| s.children.clone()).await;

    if children.is_empty() {
        println!("No children yet. Add one with: chores-ctl parent add-child");
        return Ok(());
    }

    println!("Children:");
    for child in children {
        println!("  {:>4}  {}", child.id, child.name);
    }
    Ok(())
}
